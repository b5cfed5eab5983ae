pub mod cart;
pub mod dispatch;
pub mod email;
pub mod order_service;
pub mod report;
