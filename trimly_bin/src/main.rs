use std::sync::Arc;

use dao::client::ClientEntity;
use dao::combo::ComboEntity;
use dao::employee::{DayScheduleEntity, EmployeeEntity};
use dao::plan::{PlanEntitlementEntity, PlanEntity};
use dao::product::ProductEntity;
use dao::service_offering::ServiceOfferingEntity;
use dao::voucher::{DiscountKindEntity, VoucherEntity};
use dao::UserEntity;
use dao_impl_memory::{
    appointment::AppointmentDaoImpl, client::ClientDaoImpl, client_package::ClientPackageDaoImpl,
    combo::ComboDaoImpl, employee::EmployeeDaoImpl, plan::PlanDaoImpl, product::ProductDaoImpl,
    sale::SaleDaoImpl, service_offering::ServiceOfferingDaoImpl, voucher::VoucherDaoImpl,
    PermissionDaoImpl, PrivilegeRow,
};
use service::appointment::{AppointmentService as _, BookingOutcome, BookingRequest};
use service::availability::{AvailabilityService as _, EmployeeChoice};
use service::cart::CartService as _;
use service::catalog::OfferingRef;
use service::clock::ClockService as _;
use service::employee::EmployeeService as _;
use service::permission::Authentication;
use service::plan::ClientPackageService as _;
use service::sale::{Payment, PaymentMethod, SaleService as _};
use time::macros::time;
use time::{Date, Weekday};
#[cfg(feature = "json_logging")]
use tracing_subscriber::fmt::format::FmtSpan;
use uuid::{uuid, Uuid};

type Context = ();
type PermissionDao = PermissionDaoImpl;
type EmployeeDao = EmployeeDaoImpl;
type ClientDao = ClientDaoImpl;
type ServiceOfferingDao = ServiceOfferingDaoImpl;
type ComboDao = ComboDaoImpl;
type ProductDao = ProductDaoImpl;
type AppointmentDao = AppointmentDaoImpl;
type PlanDao = PlanDaoImpl;
type ClientPackageDao = ClientPackageDaoImpl;
type VoucherDao = VoucherDaoImpl;
type SaleDao = SaleDaoImpl;

type UserService = service_impl::permission::UserServiceDev;
type PermissionService =
    service_impl::permission::PermissionServiceImpl<PermissionDao, UserService>;
type ClockService = service_impl::clock::ClockServiceImpl;
type UuidService = service_impl::uuid_service::UuidServiceImpl;
type RandomService = service_impl::random::RandomServiceImpl;
type EmployeeService = service_impl::employee::EmployeeServiceImpl<EmployeeDao, PermissionService>;
type ClientService = service_impl::client::ClientServiceImpl<ClientDao, PermissionService>;
type CatalogService = service_impl::catalog::CatalogServiceImpl<
    ServiceOfferingDao,
    ComboDao,
    ProductDao,
    PermissionService,
>;
type QualificationService =
    service_impl::qualification::QualificationServiceImpl<EmployeeService>;
type AvailabilityService = service_impl::availability::AvailabilityServiceImpl<
    AppointmentDao,
    EmployeeService,
    CatalogService,
    QualificationService,
    PermissionService,
    ClockService,
>;
type AppointmentService = service_impl::appointment::AppointmentServiceImpl<
    AppointmentDao,
    AvailabilityService,
    CatalogService,
    QualificationService,
    ClientService,
    PermissionService,
    ClockService,
    UuidService,
    RandomService,
>;
type ClientPackageService = service_impl::plan::ClientPackageServiceImpl<
    PlanDao,
    ClientPackageDao,
    ClientService,
    PermissionService,
    ClockService,
    UuidService,
>;
type SaleService = service_impl::sale::SaleServiceImpl<
    SaleDao,
    ClientPackageService,
    AppointmentService,
    PermissionService,
    ClockService,
    UuidService,
>;
type CartService = service_impl::cart::CartServiceImpl<
    VoucherDao,
    CatalogService,
    ClientService,
    EmployeeService,
    ClientPackageService,
    SaleService,
    PermissionService,
    UuidService,
>;

const MARTA_EMPLOYEE_ID: Uuid = uuid!("7D0A3C15-6E2B-4C7F-9D38-1FAB5E20C461");
const PAULO_EMPLOYEE_ID: Uuid = uuid!("A24C1B5E-88D1-4327-BD29-9AC2C4A8F4E1");
const ANA_CLIENT_ID: Uuid = uuid!("0F41DA72-CB87-4B5D-9C2F-6FD5D0A5B90D");
const CORTE_SERVICE_ID: Uuid = uuid!("52C8CE02-DB4B-4B85-9A3C-1C3ADBE9A71B");
const BARBA_SERVICE_ID: Uuid = uuid!("8E11F6A9-0C4D-4B57-9E52-DB1C2F7A6430");
const CORTE_BARBA_COMBO_ID: Uuid = uuid!("C1E8B4D2-3F76-4E09-A85B-64D9E0C2F713");
const POMADA_PRODUCT_ID: Uuid = uuid!("5A0D7E31-92C6-4F18-B4A7-E86C1D3B9F20");
const PLANO_MENSAL_ID: Uuid = uuid!("3D9E0F7C-94A1-4AF1-86E6-7C2D3CBAE1F0");

fn weekly_schedule() -> Arc<[DayScheduleEntity]> {
    [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ]
    .into_iter()
    .map(|weekday| DayScheduleEntity {
        weekday,
        active: true,
        start: time!(09:00),
        end: time!(18:00),
        break_start: Some(time!(12:00)),
        break_end: Some(time!(13:00)),
    })
    .collect()
}

fn seeded_employees() -> [EmployeeEntity; 2] {
    [
        EmployeeEntity {
            id: MARTA_EMPLOYEE_ID,
            name: "Marta".into(),
            specialties: Arc::new(["corte".into(), "barba".into()]),
            schedule: weekly_schedule(),
            deleted: None,
            version: Uuid::new_v4(),
        },
        EmployeeEntity {
            id: PAULO_EMPLOYEE_ID,
            name: "Paulo".into(),
            specialties: Arc::new(["corte".into()]),
            schedule: weekly_schedule(),
            deleted: None,
            version: Uuid::new_v4(),
        },
    ]
}

fn seeded_offerings() -> [ServiceOfferingEntity; 2] {
    [
        ServiceOfferingEntity {
            id: CORTE_SERVICE_ID,
            name: "Corte".into(),
            duration_minutes: 30,
            price_cents: 5_000,
            required_specialties: Arc::new(["corte".into()]),
            deleted: None,
            version: Uuid::new_v4(),
        },
        ServiceOfferingEntity {
            id: BARBA_SERVICE_ID,
            name: "Barba".into(),
            duration_minutes: 20,
            price_cents: 3_500,
            required_specialties: Arc::new(["barba".into()]),
            deleted: None,
            version: Uuid::new_v4(),
        },
    ]
}

pub struct EngineState {
    pub employee_service: Arc<EmployeeService>,
    pub client_package_service: Arc<ClientPackageService>,
    pub availability_service: Arc<AvailabilityService>,
    pub appointment_service: Arc<AppointmentService>,
    pub cart_service: Arc<CartService>,
    pub sale_service: Arc<SaleService>,
    pub clock_service: Arc<ClockService>,
}
impl EngineState {
    pub fn new(race_probability: f64) -> Self {
        let permission_dao = Arc::new(PermissionDao::with_rows(
            [UserEntity {
                name: "DEVUSER".into(),
            }],
            ["frontdesk", "cashier", "admin"].map(|privilege| PrivilegeRow {
                user: "DEVUSER".into(),
                privilege: privilege.into(),
            }),
        ));
        let employee_dao = Arc::new(EmployeeDao::with_rows(seeded_employees()));
        let client_dao = Arc::new(ClientDao::with_rows([ClientEntity {
            id: ANA_CLIENT_ID,
            name: "Ana".into(),
            phone: Some("+55 11 91234-5678".into()),
            deleted: None,
            version: Uuid::new_v4(),
        }]));
        let service_offering_dao = Arc::new(ServiceOfferingDao::with_rows(seeded_offerings()));
        let combo_dao = Arc::new(ComboDao::with_rows([ComboEntity {
            id: CORTE_BARBA_COMBO_ID,
            name: "Corte + Barba".into(),
            service_ids: Arc::new([CORTE_SERVICE_ID, BARBA_SERVICE_ID]),
            price_cents: 7_500,
            deleted: None,
            version: Uuid::new_v4(),
        }]));
        let product_dao = Arc::new(ProductDao::with_rows([ProductEntity {
            id: POMADA_PRODUCT_ID,
            name: "Pomada modeladora".into(),
            price_cents: 4_000,
            deleted: None,
            version: Uuid::new_v4(),
        }]));
        let plan_dao = Arc::new(PlanDao::with_rows([PlanEntity {
            id: PLANO_MENSAL_ID,
            name: "Plano mensal".into(),
            price_cents: 9_900,
            validity_days: 30,
            entitlements: Arc::new([PlanEntitlementEntity {
                service_id: CORTE_SERVICE_ID,
                quantity: 4,
            }]),
            deleted: None,
            version: Uuid::new_v4(),
        }]));
        let voucher_dao = Arc::new(VoucherDao::with_rows([VoucherEntity {
            id: Uuid::new_v4(),
            code: "PROMO10".into(),
            kind: DiscountKindEntity::Percentage,
            amount: 10,
            active: true,
            deleted: None,
            version: Uuid::new_v4(),
        }]));
        let appointment_dao = Arc::new(AppointmentDao::new());
        let client_package_dao = Arc::new(ClientPackageDao::new());
        let sale_dao = Arc::new(SaleDao::new());

        let user_service = Arc::new(UserService::new("DEVUSER".into()));
        let permission_service = Arc::new(PermissionService::new(permission_dao, user_service));
        let clock_service = Arc::new(service_impl::clock::ClockServiceImpl);
        let uuid_service = Arc::new(service_impl::uuid_service::UuidServiceImpl);
        let random_service = Arc::new(service_impl::random::RandomServiceImpl);
        let employee_service = Arc::new(EmployeeService::new(
            employee_dao,
            permission_service.clone(),
        ));
        let client_service = Arc::new(ClientService::new(client_dao, permission_service.clone()));
        let catalog_service = Arc::new(CatalogService::new(
            service_offering_dao,
            combo_dao,
            product_dao,
            permission_service.clone(),
        ));
        let qualification_service =
            Arc::new(QualificationService::new(employee_service.clone()));
        let availability_service = Arc::new(AvailabilityService::new(
            appointment_dao.clone(),
            employee_service.clone(),
            catalog_service.clone(),
            qualification_service.clone(),
            permission_service.clone(),
            clock_service.clone(),
        ));
        let appointment_service = Arc::new(AppointmentService::new(
            appointment_dao,
            availability_service.clone(),
            catalog_service.clone(),
            qualification_service,
            client_service.clone(),
            permission_service.clone(),
            clock_service.clone(),
            uuid_service.clone(),
            random_service,
            race_probability,
        ));
        let client_package_service = Arc::new(ClientPackageService::new(
            plan_dao,
            client_package_dao,
            client_service.clone(),
            permission_service.clone(),
            clock_service.clone(),
            uuid_service.clone(),
        ));
        let sale_service = Arc::new(SaleService::new(
            sale_dao,
            client_package_service.clone(),
            appointment_service.clone(),
            permission_service.clone(),
            clock_service.clone(),
            uuid_service.clone(),
        ));
        let cart_service = Arc::new(CartService::new(
            voucher_dao,
            catalog_service,
            client_service,
            employee_service.clone(),
            client_package_service.clone(),
            sale_service.clone(),
            permission_service,
            uuid_service,
        ));

        Self {
            employee_service,
            client_package_service,
            availability_service,
            appointment_service,
            cart_service,
            sale_service,
            clock_service,
        }
    }
}

fn next_monday(state: &EngineState) -> Date {
    let mut date = state.clock_service.date_now();
    loop {
        date = date.next_day().expect("calendar overflow");
        if date.weekday() == Weekday::Monday {
            return date;
        }
    }
}

/// Walks one front-desk day end to end: roster, package activation,
/// the availability board, a booking and a checkout.
async fn demo_walkthrough(state: &EngineState) {
    let context: Authentication<Context> = ().into();

    let employees = state
        .employee_service
        .get_all(context.clone())
        .await
        .expect("Expected the seeded roster");
    for employee in employees.iter() {
        tracing::info!(name = %employee.name, specialties = ?employee.specialties, "on the roster");
    }

    let package = state
        .client_package_service
        .activate(ANA_CLIENT_ID, PLANO_MENSAL_ID, false, context.clone())
        .await
        .expect("Expected the package activation to succeed");
    tracing::info!(expires_on = %package.expires_on, "package active for Ana");

    let date = next_monday(state);
    let slots = state
        .availability_service
        .slots_for_day(
            date,
            OfferingRef::Service(CORTE_SERVICE_ID),
            EmployeeChoice::Any,
            None,
            context.clone(),
        )
        .await
        .expect("Expected the availability board");
    let open = slots.iter().filter(|slot| slot.is_open()).count();
    tracing::info!(%date, open, total = slots.len(), "availability board");

    let Some(first_open) = slots.iter().find(|slot| slot.is_open()) else {
        tracing::warn!(%date, "no open slot, skipping the booking");
        return;
    };
    let outcome = state
        .appointment_service
        .book(
            &BookingRequest {
                client_id: ANA_CLIENT_ID,
                offering: OfferingRef::Service(CORTE_SERVICE_ID),
                employee: EmployeeChoice::Any,
                date,
                start: first_open.start,
                reschedule_of: None,
            },
            context.clone(),
        )
        .await
        .expect("Expected the booking attempt to go through");
    let appointment_id = match outcome {
        BookingOutcome::Booked(appointment) => {
            tracing::info!(
                start = %appointment.start,
                employee_id = %appointment.employee_id,
                "appointment booked"
            );
            Some(appointment.id)
        }
        BookingOutcome::SlotTaken => {
            tracing::info!("slot went to a concurrent booking");
            None
        }
    };

    state
        .cart_service
        .select_client(ANA_CLIENT_ID, context.clone())
        .await
        .expect("Expected the client selection");
    state
        .cart_service
        .set_operator(MARTA_EMPLOYEE_ID, context.clone())
        .await
        .expect("Expected the operator");
    state
        .cart_service
        .add_offering(
            OfferingRef::Service(CORTE_SERVICE_ID),
            Some(MARTA_EMPLOYEE_ID),
            context.clone(),
        )
        .await
        .expect("Expected the service line");
    state
        .cart_service
        .add_product(POMADA_PRODUCT_ID, context.clone())
        .await
        .expect("Expected the product line");
    if let Some(appointment_id) = appointment_id {
        state
            .cart_service
            .attach_appointment(appointment_id, context.clone())
            .await
            .expect("Expected the appointment attachment");
    }
    state
        .cart_service
        .apply_voucher("PROMO10", context.clone())
        .await
        .expect("Expected the voucher");
    let summary = state
        .cart_service
        .summary(context.clone())
        .await
        .expect("Expected the cart summary");
    tracing::info!(
        subtotal = summary.subtotal_cents,
        discount = summary.discount_cents,
        plan_credit = summary.plan_credit_cents,
        total = summary.total_cents,
        "cart summary"
    );

    state
        .cart_service
        .start_payment(context.clone())
        .await
        .expect("Expected the payment phase");
    let sale = state
        .cart_service
        .checkout(
            &[Payment {
                method: PaymentMethod::Cash,
                amount_cents: summary.total_cents,
            }],
            context.clone(),
        )
        .await
        .expect("Expected the checkout");
    tracing::info!(id = %sale.id, total = sale.total_cents, "sale finalized");

    let credit = state
        .client_package_service
        .credit_for(ANA_CLIENT_ID, CORTE_SERVICE_ID, context.clone())
        .await
        .expect("Expected the remaining credit");
    tracing::info!(remaining = credit.remaining(), "plan credit after checkout");

    let sales = state
        .sale_service
        .get_all(context)
        .await
        .expect("Expected the sales list");
    tracing::info!(count = sales.len(), "sales on record");
}

#[tokio::main]
async fn main() {
    #[cfg(feature = "local_logging")]
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::DEBUG)
        .pretty()
        .with_file(true)
        .finish();

    #[cfg(feature = "json_logging")]
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .json()
        .with_span_events(FmtSpan::CLOSE)
        .with_span_list(true)
        .with_file(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    tracing::info!("Trimly engine version: {}", env!("CARGO_PKG_VERSION"));
    dotenvy::dotenv().ok();
    let race_probability = std::env::var("TRIMLY_SLOT_RACE_PROBABILITY")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(0.15);

    let state = EngineState::new(race_probability);
    demo_walkthrough(&state).await;
}
