pub mod assets;
pub mod http;
pub mod imaging;
pub mod onnx;
pub mod pdf;
