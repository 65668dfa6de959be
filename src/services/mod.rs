pub mod groups;
pub mod identity;
pub mod membership;
pub mod pending_payments;
pub mod razorpay;
pub mod reconciler;
pub mod subscriptions;

use actix_web::web::{self, Data};

use crate::config::Config;
use crate::handlers;

/// The wired service graph. One instance per process; actix worker threads
/// share it through the `Arc`s inside each service.
#[derive(Clone)]
pub struct AppServices {
    pub identity: identity::IdentityService,
    pub subscriptions: subscriptions::SubscriptionRegistry,
    pub groups: groups::GroupRegistry,
    pub memberships: membership::MembershipLedger,
    pub obligations: pending_payments::PendingPaymentBook,
    pub reconciler: reconciler::PaymentReconciler,
}

impl AppServices {
    pub fn build(config: &Config) -> Self {
        let identity = identity::IdentityService::new(config.token_secret.clone());
        let subscriptions = subscriptions::SubscriptionRegistry::new();
        let groups = groups::GroupRegistry::new(subscriptions.clone());
        let obligations = pending_payments::PendingPaymentBook::new();
        let memberships = membership::MembershipLedger::new(groups.clone(), obligations.clone());
        let gateway = razorpay::RazorpayClient::new(
            config.razorpay.api_base.clone(),
            config.razorpay.key_id.clone(),
            config.razorpay.key_secret.clone(),
            config.razorpay.webhook_secret.clone(),
        );
        let reconciler = reconciler::PaymentReconciler::new(
            obligations.clone(),
            memberships.clone(),
            groups.clone(),
            subscriptions.clone(),
            gateway,
            config.razorpay.currency.clone(),
        );

        Self {
            identity,
            subscriptions,
            groups,
            memberships,
            obligations,
            reconciler,
        }
    }

    /// Registers shared state and the `/api/v1` routing tree. Shared with the
    /// integration tests so they exercise the same surface the binary serves.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(Data::new(self.identity.clone()))
            .app_data(Data::new(self.subscriptions.clone()))
            .app_data(Data::new(self.groups.clone()))
            .app_data(Data::new(self.memberships.clone()))
            .app_data(Data::new(self.reconciler.clone()))
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/subscriptions")
                            .service(handlers::subscription::list_subscriptions)
                            .service(handlers::subscription::create_subscription)
                            .service(handlers::subscription::get_subscription)
                            .service(handlers::subscription::update_subscription)
                            .service(handlers::subscription::delete_subscription),
                    )
                    .service(
                        web::scope("/groups")
                            .service(handlers::group::my_groups)
                            .service(handlers::group::create_group)
                            .service(handlers::group::browse_groups)
                            .service(handlers::group::join_group)
                            .service(handlers::group::decide_request)
                            .service(handlers::group::remove_member)
                            .service(handlers::group::delete_group),
                    )
                    .service(
                        web::scope("/payments")
                            .service(handlers::payment::list_payments)
                            .service(handlers::payment::create_order)
                            .service(handlers::payment::payment_webhook),
                    )
                    .route("/health", web::get().to(handlers::health_check)),
            );
    }
}
