use errors::NativeError;

pub mod command;
pub mod errors;
pub mod frame;

pub trait Serializable {
    fn to_bytes(&self) -> std::result::Result<Vec<u8>, NativeError>;

    fn from_bytes(bytes: &[u8]) -> std::result::Result<Self, NativeError>
    where
        Self: Sized;
}
