/// Size of a single quantization bucket per channel, giving 8 buckets per channel.
pub const BUCKET_SIZE: u8 = 32;

/// A trait to reduce a channel value to the lower bound of its bucket.
pub trait Quantize {
    /// Returns `self` floored to the nearest lower multiple of [`BUCKET_SIZE`].
    fn quantize(self) -> Self;
}

macro_rules! impl_quantize {
    ($($t:ty)*) => ($(
        impl Quantize for $t {
            fn quantize(self) -> $t {
                (self / BUCKET_SIZE as $t) * BUCKET_SIZE as $t
            }
        }
    )*)
}

impl_quantize! { u8 u16 u32 }
