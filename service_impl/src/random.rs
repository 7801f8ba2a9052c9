use rand::Rng;
use service::random::RandomService;

pub struct RandomServiceImpl;

impl RandomService for RandomServiceImpl {
    fn roll(&self, _usage: &str) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}
