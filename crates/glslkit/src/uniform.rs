//! Uniform handles and the typed uniform value union.
//!
//! A [`Uniform`] is a lightweight handle to one uniform location inside a
//! linked program, resolved once by name. Assignment goes through a single
//! tagged union, [`UniformValue`], instead of one entry point per data
//! shape: the variant encodes shape, element type and count, and the driver
//! dispatches it to the matching call. Matrices are always passed
//! non-transposed, column-major, one column per inner array.

use tracing::trace;

use crate::context::Context;
use crate::driver::{RawId, NO_LOCATION};

/// A value assignable to a uniform location.
///
/// Slice variants cover dynamically-sized arrays (fixed-size arrays coerce
/// to slices at the call site). The 64-bit integer variants map to the
/// `NV_gpu_shader5` vendor extension.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue<'a> {
    // 32-bit signed integers
    Int(i32),
    IntVec2([i32; 2]),
    IntVec3([i32; 3]),
    IntVec4([i32; 4]),
    IntSlice(&'a [i32]),
    IntVec2Slice(&'a [[i32; 2]]),
    IntVec3Slice(&'a [[i32; 3]]),
    IntVec4Slice(&'a [[i32; 4]]),

    // 32-bit unsigned integers
    UInt(u32),
    UIntVec2([u32; 2]),
    UIntVec3([u32; 3]),
    UIntVec4([u32; 4]),
    UIntSlice(&'a [u32]),
    UIntVec2Slice(&'a [[u32; 2]]),
    UIntVec3Slice(&'a [[u32; 3]]),
    UIntVec4Slice(&'a [[u32; 4]]),

    // 64-bit signed integers (vendor extension)
    Int64(i64),
    Int64Vec2([i64; 2]),
    Int64Vec3([i64; 3]),
    Int64Vec4([i64; 4]),
    Int64Slice(&'a [i64]),
    Int64Vec2Slice(&'a [[i64; 2]]),
    Int64Vec3Slice(&'a [[i64; 3]]),
    Int64Vec4Slice(&'a [[i64; 4]]),

    // 64-bit unsigned integers (vendor extension)
    UInt64(u64),
    UInt64Vec2([u64; 2]),
    UInt64Vec3([u64; 3]),
    UInt64Vec4([u64; 4]),
    UInt64Slice(&'a [u64]),
    UInt64Vec2Slice(&'a [[u64; 2]]),
    UInt64Vec3Slice(&'a [[u64; 3]]),
    UInt64Vec4Slice(&'a [[u64; 4]]),

    // single-precision floats
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    FloatSlice(&'a [f32]),
    Vec2Slice(&'a [[f32; 2]]),
    Vec3Slice(&'a [[f32; 3]]),
    Vec4Slice(&'a [[f32; 4]]),

    // double-precision floats
    Double(f64),
    DVec2([f64; 2]),
    DVec3([f64; 3]),
    DVec4([f64; 4]),
    DoubleSlice(&'a [f64]),
    DVec2Slice(&'a [[f64; 2]]),
    DVec3Slice(&'a [[f64; 3]]),
    DVec4Slice(&'a [[f64; 4]]),

    // single-precision matrices, [columns][rows]
    Mat2([[f32; 2]; 2]),
    Mat2x3([[f32; 3]; 2]),
    Mat2x4([[f32; 4]; 2]),
    Mat3x2([[f32; 2]; 3]),
    Mat3([[f32; 3]; 3]),
    Mat3x4([[f32; 4]; 3]),
    Mat4x2([[f32; 2]; 4]),
    Mat4x3([[f32; 3]; 4]),
    Mat4([[f32; 4]; 4]),
    Mat2Slice(&'a [[[f32; 2]; 2]]),
    Mat2x3Slice(&'a [[[f32; 3]; 2]]),
    Mat2x4Slice(&'a [[[f32; 4]; 2]]),
    Mat3x2Slice(&'a [[[f32; 2]; 3]]),
    Mat3Slice(&'a [[[f32; 3]; 3]]),
    Mat3x4Slice(&'a [[[f32; 4]; 3]]),
    Mat4x2Slice(&'a [[[f32; 2]; 4]]),
    Mat4x3Slice(&'a [[[f32; 3]; 4]]),
    Mat4Slice(&'a [[[f32; 4]; 4]]),

    // double-precision matrices, [columns][rows]
    DMat2([[f64; 2]; 2]),
    DMat2x3([[f64; 3]; 2]),
    DMat2x4([[f64; 4]; 2]),
    DMat3x2([[f64; 2]; 3]),
    DMat3([[f64; 3]; 3]),
    DMat3x4([[f64; 4]; 3]),
    DMat4x2([[f64; 2]; 4]),
    DMat4x3([[f64; 3]; 4]),
    DMat4([[f64; 4]; 4]),
    DMat2Slice(&'a [[[f64; 2]; 2]]),
    DMat2x3Slice(&'a [[[f64; 3]; 2]]),
    DMat2x4Slice(&'a [[[f64; 4]; 2]]),
    DMat3x2Slice(&'a [[[f64; 2]; 3]]),
    DMat3Slice(&'a [[[f64; 3]; 3]]),
    DMat3x4Slice(&'a [[[f64; 4]; 3]]),
    DMat4x2Slice(&'a [[[f64; 2]; 4]]),
    DMat4x3Slice(&'a [[[f64; 3]; 4]]),
    DMat4Slice(&'a [[[f64; 4]; 4]]),
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident,)*) => {$(
        impl<'a> From<$ty> for UniformValue<'a> {
            fn from(value: $ty) -> Self {
                UniformValue::$variant(value)
            }
        }
    )*};
}

impl_from! {
    i32 => Int,
    [i32; 2] => IntVec2,
    [i32; 3] => IntVec3,
    [i32; 4] => IntVec4,
    &'a [i32] => IntSlice,
    &'a [[i32; 2]] => IntVec2Slice,
    &'a [[i32; 3]] => IntVec3Slice,
    &'a [[i32; 4]] => IntVec4Slice,

    u32 => UInt,
    [u32; 2] => UIntVec2,
    [u32; 3] => UIntVec3,
    [u32; 4] => UIntVec4,
    &'a [u32] => UIntSlice,
    &'a [[u32; 2]] => UIntVec2Slice,
    &'a [[u32; 3]] => UIntVec3Slice,
    &'a [[u32; 4]] => UIntVec4Slice,

    i64 => Int64,
    [i64; 2] => Int64Vec2,
    [i64; 3] => Int64Vec3,
    [i64; 4] => Int64Vec4,
    &'a [i64] => Int64Slice,
    &'a [[i64; 2]] => Int64Vec2Slice,
    &'a [[i64; 3]] => Int64Vec3Slice,
    &'a [[i64; 4]] => Int64Vec4Slice,

    u64 => UInt64,
    [u64; 2] => UInt64Vec2,
    [u64; 3] => UInt64Vec3,
    [u64; 4] => UInt64Vec4,
    &'a [u64] => UInt64Slice,
    &'a [[u64; 2]] => UInt64Vec2Slice,
    &'a [[u64; 3]] => UInt64Vec3Slice,
    &'a [[u64; 4]] => UInt64Vec4Slice,

    f32 => Float,
    [f32; 2] => Vec2,
    [f32; 3] => Vec3,
    [f32; 4] => Vec4,
    &'a [f32] => FloatSlice,
    &'a [[f32; 2]] => Vec2Slice,
    &'a [[f32; 3]] => Vec3Slice,
    &'a [[f32; 4]] => Vec4Slice,

    f64 => Double,
    [f64; 2] => DVec2,
    [f64; 3] => DVec3,
    [f64; 4] => DVec4,
    &'a [f64] => DoubleSlice,
    &'a [[f64; 2]] => DVec2Slice,
    &'a [[f64; 3]] => DVec3Slice,
    &'a [[f64; 4]] => DVec4Slice,

    [[f32; 2]; 2] => Mat2,
    [[f32; 3]; 2] => Mat2x3,
    [[f32; 4]; 2] => Mat2x4,
    [[f32; 2]; 3] => Mat3x2,
    [[f32; 3]; 3] => Mat3,
    [[f32; 4]; 3] => Mat3x4,
    [[f32; 2]; 4] => Mat4x2,
    [[f32; 3]; 4] => Mat4x3,
    [[f32; 4]; 4] => Mat4,
    &'a [[[f32; 2]; 2]] => Mat2Slice,
    &'a [[[f32; 3]; 2]] => Mat2x3Slice,
    &'a [[[f32; 4]; 2]] => Mat2x4Slice,
    &'a [[[f32; 2]; 3]] => Mat3x2Slice,
    &'a [[[f32; 3]; 3]] => Mat3Slice,
    &'a [[[f32; 4]; 3]] => Mat3x4Slice,
    &'a [[[f32; 2]; 4]] => Mat4x2Slice,
    &'a [[[f32; 3]; 4]] => Mat4x3Slice,
    &'a [[[f32; 4]; 4]] => Mat4Slice,

    [[f64; 2]; 2] => DMat2,
    [[f64; 3]; 2] => DMat2x3,
    [[f64; 4]; 2] => DMat2x4,
    [[f64; 2]; 3] => DMat3x2,
    [[f64; 3]; 3] => DMat3,
    [[f64; 4]; 3] => DMat3x4,
    [[f64; 2]; 4] => DMat4x2,
    [[f64; 3]; 4] => DMat4x3,
    [[f64; 4]; 4] => DMat4,
    &'a [[[f64; 2]; 2]] => DMat2Slice,
    &'a [[[f64; 3]; 2]] => DMat2x3Slice,
    &'a [[[f64; 4]; 2]] => DMat2x4Slice,
    &'a [[[f64; 2]; 3]] => DMat3x2Slice,
    &'a [[[f64; 3]; 3]] => DMat3Slice,
    &'a [[[f64; 4]; 3]] => DMat3x4Slice,
    &'a [[[f64; 2]; 4]] => DMat4x2Slice,
    &'a [[[f64; 3]; 4]] => DMat4x3Slice,
    &'a [[[f64; 4]; 4]] => DMat4Slice,
}

/// A handle to one uniform location inside a program.
///
/// The location is resolved once, when the handle is created, and stays
/// valid until the owning program is relinked. A handle for a name that is
/// not active in the program carries the `-1` sentinel: it reports
/// inactive and every assignment through it is a silent no-op.
#[derive(Clone)]
pub struct Uniform {
    ctx: Context,
    program: RawId,
    location: i32,
}

impl Uniform {
    pub(crate) fn resolve(ctx: &Context, program: RawId, name: &str) -> Self {
        let location = ctx.driver().uniform_location(program, name);
        trace!("program {program} uniform [{name}] has location [{location}]");
        Self {
            ctx: ctx.clone(),
            program,
            location,
        }
    }

    /// True iff the uniform was found and active at resolution time.
    ///
    /// An inactive handle covers both a misspelled name and a uniform the
    /// compiler optimized out; the driver does not distinguish the two.
    pub fn is_active(&self) -> bool {
        self.location != NO_LOCATION
    }

    /// The resolved location, or `None` for an inactive handle.
    pub fn location(&self) -> Option<i32> {
        self.is_active().then_some(self.location)
    }

    /// The resolved location with the driver's `-1` sentinel untranslated.
    pub fn raw_location(&self) -> i32 {
        self.location
    }

    /// The id of the program the handle was resolved against.
    pub fn program_id(&self) -> RawId {
        self.program
    }

    /// Assigns `value` to the uniform in the currently enabled program.
    ///
    /// Inactive handles ignore the assignment. The call does not check that
    /// the owning program is the one currently enabled; keeping those in
    /// sync is the caller's responsibility.
    pub fn set<'a>(&self, value: impl Into<UniformValue<'a>>) {
        if !self.is_active() {
            return;
        }
        self.ctx.driver().set_uniform(self.location, &value.into());
    }
}

impl std::fmt::Debug for Uniform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Uniform")
            .field("program", &self.program)
            .field("location", &self.location)
            .finish()
    }
}
