//! Declarative helpers shared by the HTTP apps.

#[cfg(feature = "actix")]
#[doc(hidden)]
pub use actix_web;

/// Generate a `pub fn routes(cfg: &mut ServiceConfig)` for a route module.
///
/// Each entry is either `route <service>` for a handler annotated with one of
/// the actix method macros, or `configure <fn>` to pull in another module's
/// generated `routes` function.
///
/// ```ignore
/// macros_utils::routes! {
///     route health_route,
///     configure api::routes,
/// }
/// ```
#[cfg(feature = "actix")]
#[macro_export]
macro_rules! routes {
    ($($kind:ident $item:path),* $(,)?) => {
        pub fn routes(cfg: &mut $crate::actix_web::web::ServiceConfig) {
            $( $crate::__route_entry!(cfg, $kind $item); )*
        }
    };
}

#[cfg(feature = "actix")]
#[doc(hidden)]
#[macro_export]
macro_rules! __route_entry {
    ($cfg:ident, route $item:path) => {
        $cfg.service($item);
    };
    ($cfg:ident, configure $item:path) => {
        $cfg.configure($item);
    };
}
