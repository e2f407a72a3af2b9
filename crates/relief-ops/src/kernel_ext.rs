use relief_kernel::{Kernel, KernelIntrospect, KernelSolidHandle};

/// A kernel the relief pipeline can both build with and query.
///
/// Placement needs face queries in the middle of a build, and a `&mut dyn
/// Kernel` cannot be viewed as `&dyn KernelIntrospect` directly.
pub trait KernelBundle: Kernel + KernelIntrospect {
    fn as_introspect(&self) -> &dyn KernelIntrospect;

    /// Release every handle in `solids`.
    fn release_all(&mut self, solids: &[KernelSolidHandle]) {
        for solid in solids {
            self.release(solid);
        }
    }
}

impl<T: Kernel + KernelIntrospect> KernelBundle for T {
    fn as_introspect(&self) -> &dyn KernelIntrospect {
        self
    }
}
