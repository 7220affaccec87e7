pub mod health;
pub mod rpc;

use rocket::{catchers, routes};

pub fn get_routes() -> Vec<rocket::Route> {
    routes![
        health::health_check,
        // Legacy query-string interface
        rpc::rpc_get,
        rpc::rpc_post,
        // Versioned routes
        rpc::openapi_info,
        rpc::openapi_multiinfo,
        rpc::openapi_multiinfo_post,
        rpc::openapi_search_arg,
        rpc::openapi_search,
        rpc::openapi_search_post,
        rpc::openapi_suggest,
    ]
}

pub fn get_catchers() -> Vec<rocket::Catcher> {
    catchers![
        rpc::bad_request_catcher,
        rpc::not_found_catcher,
        rpc::payload_too_large_catcher,
        rpc::unprocessable_catcher,
    ]
}
