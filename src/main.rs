use rocket::launch;

#[launch]
async fn rocket() -> _ {
    env_logger::init();

    aurweb_rpc::create_rocket()
}
