mod common;
mod decisions;
mod forms;
mod payload;
mod service;
