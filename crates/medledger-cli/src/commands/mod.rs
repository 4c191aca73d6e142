pub mod canonicalize;
pub mod keygen;
pub mod replay;
pub mod sign;
pub mod verify;
