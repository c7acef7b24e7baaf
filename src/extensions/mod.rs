mod quantize_ext;

pub use quantize_ext::Quantize;
