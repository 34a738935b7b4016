use actix_web::web;

use crate::signup::sign_up;

pub fn init(cfg: &mut web::ServiceConfig) {
    cfg.route("/sign-up", web::post().to(sign_up));
}
