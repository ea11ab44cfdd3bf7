pub mod catalog_service;
pub mod crediting_service;
pub mod index_return_service;
pub mod report_service;
