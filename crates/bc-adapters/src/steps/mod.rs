pub mod export;
pub mod extract;
pub mod load;
pub mod transform;
