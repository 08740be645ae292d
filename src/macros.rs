/* Tracing of the DOM walk is compiled away unless the `html_trace`
 * feature is enabled, in which case it goes to the `log` facade at
 * trace level.
 */
#[cfg(not(feature = "html_trace"))]
#[inline(always)]
pub fn nop() {}

#[cfg(feature = "html_trace")]
#[macro_export]
#[doc(hidden)]
macro_rules! html_trace {
    ($fmt:expr) => {
         log::trace!($fmt);
    };
    ($fmt:expr, $( $args:expr ),*) => {
         log::trace!($fmt, $( $args ),*);
    };
}
#[cfg(not(feature = "html_trace"))]
#[macro_export]
#[doc(hidden)]
macro_rules! html_trace {
    ($fmt:expr) => { $crate::macros::nop(); };
    ($fmt:expr, $( $args:expr ),*) => { $crate::macros::nop(); };
}
