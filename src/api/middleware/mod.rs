pub mod hidden_files;
pub mod request_id;
