mod common;
mod payload;
mod syncer;
