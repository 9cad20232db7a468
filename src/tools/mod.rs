pub mod inspect;
pub mod rename;
pub mod verify;
