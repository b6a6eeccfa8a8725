use num_traits::{Float, FromPrimitive};
use std::fmt::{Debug, Display};

/// A trait for types that can be used as scalar values in iteration state.
/// Must support floating-point arithmetic, conversion from f64, and
/// formatting (stop conditions render their reasons as text).
pub trait Scalar: Float + FromPrimitive + Debug + Display + 'static {}

impl<T: Float + FromPrimitive + Debug + Display + 'static> Scalar for T {}
