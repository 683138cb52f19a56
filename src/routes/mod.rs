use actix_web::web::ServiceConfig;
use states::states_list;

mod states;

pub fn hbnb_routes(conf: &mut ServiceConfig) {
    conf.service(states_list);
}
