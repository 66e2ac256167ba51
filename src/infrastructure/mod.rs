//! 基础设施层（Infrastructure）
//!
//! 持有稀缺资源（浏览器页面），只向上暴露页面控制能力

pub mod chrome_page;
pub mod page_controller;

pub use chrome_page::ChromePage;
pub use page_controller::{Locator, PageController, SessionFactory};
