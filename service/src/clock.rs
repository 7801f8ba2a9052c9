use mockall::automock;

/// Wall clock behind a trait so availability and sale tests can pin
/// the current date instead of depending on when they run.
#[automock]
pub trait ClockService {
    fn time_now(&self) -> time::Time;
    fn date_now(&self) -> time::Date;
    fn date_time_now(&self) -> time::PrimitiveDateTime;
}
