//! Business logic services for the Cafe POS backend

pub mod alert;
pub mod auth;
pub mod category;
pub mod order;
pub mod product;
pub mod recipe;
pub mod report;
pub mod stock;
pub mod table;

pub use alert::AlertService;
pub use auth::AuthService;
pub use category::CategoryService;
pub use order::OrderService;
pub use product::ProductService;
pub use recipe::RecipeService;
pub use report::ReportService;
pub use stock::StockService;
pub use table::TableService;
