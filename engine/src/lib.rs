pub mod avail;
pub mod common;
pub mod constants;
pub mod settings;

#[cfg(test)]
mod testing;
