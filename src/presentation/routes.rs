use crate::presentation::auth::{check_admin, issue_jwt, list_users, register_user};
use crate::presentation::handlers::{
    add_item, create_trip, delete_item, delete_trip, get_item, get_trip, index,
    json_error_handler, list_trips, shopping_list, update_item,
};
use crate::presentation::middleware::JwtAuthMiddleware;
use actix_web::{guard, web};

/// Registers every route. Only the `/users` reads sit behind the bearer check.
pub fn configure(cfg: &mut web::ServiceConfig, jwt_secret: &str) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .route("/", web::get().to(index))
        .route("/jwt", web::post().to(issue_jwt))
        .service(
            web::resource("/users/admin/{email}")
                .route(web::get().to(check_admin))
                .wrap(JwtAuthMiddleware::new(jwt_secret)),
        )
        .service(
            web::resource("/users")
                .guard(guard::Get())
                .route(web::get().to(list_users))
                .wrap(JwtAuthMiddleware::new(jwt_secret)),
        )
        .service(web::resource("/users").route(web::post().to(register_user)))
        .route("/shoppingList", web::get().to(shopping_list))
        .service(
            web::resource("/shopping")
                .route(web::get().to(list_trips))
                .route(web::post().to(create_trip)),
        )
        .service(
            web::resource("/shopping/{id}")
                .route(web::get().to(get_trip))
                .route(web::post().to(add_item))
                .route(web::delete().to(delete_trip)),
        )
        .service(
            web::resource("/shopping/{trip_id}/item/{item_id}")
                .route(web::get().to(get_item))
                .route(web::patch().to(update_item))
                .route(web::delete().to(delete_item)),
        );
}
