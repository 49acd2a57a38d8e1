pub mod punishment;
