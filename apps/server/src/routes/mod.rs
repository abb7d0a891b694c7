mod api;
mod health;
mod status;

macros_utils::routes! {
    route status::status_route,
    route health::health_route,
    configure api::routes,
}
