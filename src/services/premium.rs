use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use color_eyre::eyre::{Context, Result, eyre};
use sea_orm::{IntoActiveModel, Set};

use crate::config::Config;
use crate::database::Database;
use crate::entities::premium_user;
use crate::error::{AppError, AppResult, Resource};
use crate::repositories::premium_user::NewPremiumUser;
use crate::repositories::{PremiumUserRepository, UserRepository};
use crate::stripe::{CheckoutSession, StripeEvent, verify_signature};

const DEFAULT_CURRENCY: &str = "usd";

#[derive(Debug, Clone)]
pub struct PremiumSettings {
    pub period: chrono::Duration,
    pub webhook_secret: Option<String>,
    pub webhook_tolerance: Duration,
}

impl PremiumSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        let period = chrono::Duration::from_std(config.premium.period()?)
            .wrap_err("premium.period is out of range")?;
        Ok(Self {
            period,
            webhook_secret: config.premium.stripe_webhook_secret(),
            webhook_tolerance: config.premium.webhook_tolerance()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PremiumStatus {
    pub active: bool,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub amount_paid: i64,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Applied {
        user_id: i64,
        end_date: DateTime<Utc>,
    },
    /// The payment was already applied by an earlier delivery.
    Duplicate,
    Ignored,
}

pub struct PremiumService {
    premium: PremiumUserRepository,
    users: UserRepository,
    settings: PremiumSettings,
}

impl PremiumService {
    pub fn new(db: Arc<Database>, settings: PremiumSettings) -> Self {
        Self {
            premium: PremiumUserRepository::new(db.clone()),
            users: UserRepository::new(db),
            settings,
        }
    }

    pub async fn status(&self, user_id: i64) -> AppResult<PremiumStatus> {
        self.status_at(user_id, Utc::now()).await
    }

    pub async fn status_at(&self, user_id: i64, now: DateTime<Utc>) -> AppResult<PremiumStatus> {
        let status = match self.premium.find_by_user(user_id).await? {
            Some(subscription) => PremiumStatus {
                active: subscription.is_active(now),
                start_date: Some(subscription.start_date),
                end_date: Some(subscription.end_date),
                amount_paid: subscription.amount_paid,
                currency: Some(subscription.currency),
            },
            None => PremiumStatus {
                active: false,
                start_date: None,
                end_date: None,
                amount_paid: 0,
                currency: None,
            },
        };
        Ok(status)
    }

    pub async fn handle_stripe_webhook(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> AppResult<WebhookOutcome> {
        self.handle_stripe_webhook_at(payload, signature, Utc::now())
            .await
    }

    #[tracing::instrument(skip(self, payload, signature))]
    pub async fn handle_stripe_webhook_at(
        &self,
        payload: &[u8],
        signature: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<WebhookOutcome> {
        let secret = self
            .settings
            .webhook_secret
            .as_deref()
            .ok_or(eyre!("Stripe webhook secret is not configured"))?;
        let signature = signature
            .ok_or_else(|| AppError::InvalidWebhook("Missing Stripe-Signature header".into()))?;
        verify_signature(
            payload,
            signature,
            secret,
            self.settings.webhook_tolerance,
            now.timestamp(),
        )
        .map_err(|e| AppError::InvalidWebhook(e.to_string()))?;

        let event = StripeEvent::from_slice(payload)
            .map_err(|e| AppError::InvalidWebhook(format!("{e:#}")))?;
        let session = event
            .checkout_session()
            .map_err(|e| AppError::InvalidWebhook(format!("{e:#}")))?;

        let Some(session) = session else {
            tracing::debug!(event_id = %event.id, event_type = %event.event_type, "Ignoring event");
            return Ok(WebhookOutcome::Ignored);
        };

        self.apply_checkout(&session, now).await
    }

    async fn apply_checkout(
        &self,
        session: &CheckoutSession,
        now: DateTime<Utc>,
    ) -> AppResult<WebhookOutcome> {
        let user_id = session
            .user_id()
            .map_err(|e| AppError::InvalidWebhook(format!("{e:#}")))?;
        if self.users.get_by_id(user_id).await?.is_none() {
            return Err(AppError::NotFound(Resource::User));
        }

        let amount = session.amount_total.unwrap_or(0);
        if amount < 0 {
            return Err(AppError::InvalidWebhook(format!(
                "Checkout session {} has a negative amount",
                session.id
            )));
        }
        let currency = session
            .currency
            .clone()
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        let subscription = match self.premium.find_by_user(user_id).await? {
            Some(existing) => {
                if existing.last_payment_reference.as_deref() == Some(session.id.as_str()) {
                    tracing::info!(user_id, session_id = %session.id, "Duplicate checkout ignored");
                    return Ok(WebhookOutcome::Duplicate);
                }
                self.extend(existing, session, amount, currency, now).await?
            }
            None => {
                self.premium
                    .add(NewPremiumUser {
                        user_id,
                        start_date: now,
                        end_date: now + self.settings.period,
                        amount_paid: amount,
                        currency,
                        payment_reference: Some(session.id.clone()),
                    })
                    .await?
            }
        };

        tracing::info!(
            user_id,
            end_date = %subscription.end_date,
            "Premium subscription updated from checkout"
        );
        Ok(WebhookOutcome::Applied {
            user_id,
            end_date: subscription.end_date,
        })
    }

    /// Active periods stack on the current end date; lapsed ones restart at `now`.
    async fn extend(
        &self,
        existing: premium_user::Model,
        session: &CheckoutSession,
        amount: i64,
        currency: String,
        now: DateTime<Utc>,
    ) -> AppResult<premium_user::Model> {
        let was_active = existing.is_active(now);
        let (start_date, end_date) = if was_active {
            (existing.start_date, existing.end_date + self.settings.period)
        } else {
            (now, now + self.settings.period)
        };
        let amount_paid = existing.amount_paid.checked_add(amount).ok_or_else(|| {
            AppError::InvalidWebhook(format!(
                "Checkout session {} overflows the amount paid",
                session.id
            ))
        })?;

        let mut active = existing.into_active_model();
        active.start_date = Set(start_date);
        active.end_date = Set(end_date);
        active.amount_paid = Set(amount_paid);
        active.currency = Set(currency);
        active.last_payment_reference = Set(Some(session.id.clone()));
        Ok(self.premium.update(active).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stripe::signature::compute_signature;
    use chrono::SubsecRound;
    use crate::test_utils::{insert_user, test_db};

    const SECRET: &str = "whsec_test";

    fn settings() -> PremiumSettings {
        PremiumSettings {
            period: chrono::Duration::days(30),
            webhook_secret: Some(SECRET.to_string()),
            webhook_tolerance: Duration::from_secs(300),
        }
    }

    fn checkout_payload(session_id: &str, user_id: i64, amount: i64) -> Vec<u8> {
        serde_json::json!({
            "id": format!("evt_{session_id}"),
            "type": "checkout.session.completed",
            "data": {"object": {
                "id": session_id,
                "client_reference_id": user_id.to_string(),
                "amount_total": amount,
                "currency": "eur"
            }}
        })
        .to_string()
        .into_bytes()
    }

    fn sign(payload: &[u8], now: DateTime<Utc>) -> String {
        let timestamp = now.timestamp();
        let signature = compute_signature(payload, timestamp, SECRET).unwrap();
        format!("t={timestamp},v1={signature}")
    }

    #[tokio::test]
    async fn test_status_without_subscription() {
        let db = test_db().await;
        let user = insert_user(&db, "mara").await;
        let service = PremiumService::new(db, settings());

        let status = service.status(user.id).await.unwrap();
        assert!(!status.active);
        assert_eq!(status.end_date, None);
        assert_eq!(status.amount_paid, 0);
    }

    #[tokio::test]
    async fn test_checkout_creates_then_extends() {
        let db = test_db().await;
        let user = insert_user(&db, "mara").await;
        let service = PremiumService::new(db, settings());
        let now = Utc::now().trunc_subsecs(0);

        let payload = checkout_payload("cs_1", user.id, 999);
        let outcome = service
            .handle_stripe_webhook_at(&payload, Some(&sign(&payload, now)), now)
            .await
            .unwrap();
        let first_end = now + chrono::Duration::days(30);
        assert_eq!(
            outcome,
            WebhookOutcome::Applied {
                user_id: user.id,
                end_date: first_end
            }
        );

        let later = now + chrono::Duration::days(10);
        let payload = checkout_payload("cs_2", user.id, 999);
        service
            .handle_stripe_webhook_at(&payload, Some(&sign(&payload, later)), later)
            .await
            .unwrap();

        let status = service.status_at(user.id, later).await.unwrap();
        assert!(status.active);
        assert_eq!(status.start_date, Some(now));
        assert_eq!(status.end_date, Some(first_end + chrono::Duration::days(30)));
        assert_eq!(status.amount_paid, 1998);
        assert_eq!(status.currency.as_deref(), Some("eur"));
    }

    #[tokio::test]
    async fn test_lapsed_subscription_restarts() {
        let db = test_db().await;
        let user = insert_user(&db, "mara").await;
        let service = PremiumService::new(db, settings());
        let now = Utc::now().trunc_subsecs(0);

        let payload = checkout_payload("cs_1", user.id, 500);
        service
            .handle_stripe_webhook_at(&payload, Some(&sign(&payload, now)), now)
            .await
            .unwrap();

        let much_later = now + chrono::Duration::days(90);
        let payload = checkout_payload("cs_2", user.id, 500);
        service
            .handle_stripe_webhook_at(&payload, Some(&sign(&payload, much_later)), much_later)
            .await
            .unwrap();

        let status = service.status_at(user.id, much_later).await.unwrap();
        assert_eq!(status.start_date, Some(much_later));
        assert_eq!(status.end_date, Some(much_later + chrono::Duration::days(30)));
        assert_eq!(status.amount_paid, 1000);
    }

    #[tokio::test]
    async fn test_redelivered_event_is_a_no_op() {
        let db = test_db().await;
        let user = insert_user(&db, "mara").await;
        let service = PremiumService::new(db, settings());
        let now = Utc::now().trunc_subsecs(0);
        let payload = checkout_payload("cs_1", user.id, 999);
        let header = sign(&payload, now);

        service
            .handle_stripe_webhook_at(&payload, Some(&header), now)
            .await
            .unwrap();
        let outcome = service
            .handle_stripe_webhook_at(&payload, Some(&header), now)
            .await
            .unwrap();
        assert_eq!(outcome, WebhookOutcome::Duplicate);

        let status = service.status_at(user.id, now).await.unwrap();
        assert_eq!(status.amount_paid, 999);
    }

    #[tokio::test]
    async fn test_rejects_bad_signatures() {
        let db = test_db().await;
        let user = insert_user(&db, "mara").await;
        let service = PremiumService::new(db, settings());
        let now = Utc::now().trunc_subsecs(0);
        let payload = checkout_payload("cs_1", user.id, 999);

        assert!(matches!(
            service.handle_stripe_webhook_at(&payload, None, now).await,
            Err(AppError::InvalidWebhook(_))
        ));
        assert!(matches!(
            service
                .handle_stripe_webhook_at(&payload, Some("t=1,v1=00"), now)
                .await,
            Err(AppError::InvalidWebhook(_))
        ));

        let stale = sign(&payload, now - chrono::Duration::minutes(10));
        assert!(matches!(
            service
                .handle_stripe_webhook_at(&payload, Some(&stale), now)
                .await,
            Err(AppError::InvalidWebhook(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_user_and_ignored_events() {
        let db = test_db().await;
        let service = PremiumService::new(db, settings());
        let now = Utc::now().trunc_subsecs(0);

        let payload = checkout_payload("cs_1", 404, 999);
        assert!(matches!(
            service
                .handle_stripe_webhook_at(&payload, Some(&sign(&payload, now)), now)
                .await,
            Err(AppError::NotFound(Resource::User))
        ));

        let payload = br#"{"id":"evt_9","type":"customer.created","data":{"object":{"id":"cus_1"}}}"#;
        let outcome = service
            .handle_stripe_webhook_at(payload, Some(&sign(payload, now)), now)
            .await
            .unwrap();
        assert_eq!(outcome, WebhookOutcome::Ignored);
    }

    #[tokio::test]
    async fn test_rejects_out_of_range_amounts() {
        let db = test_db().await;
        let user = insert_user(&db, "mara").await;
        let service = PremiumService::new(db, settings());
        let now = Utc::now().trunc_subsecs(0);

        let payload = checkout_payload("cs_negative", user.id, -500);
        assert!(matches!(
            service
                .handle_stripe_webhook_at(&payload, Some(&sign(&payload, now)), now)
                .await,
            Err(AppError::InvalidWebhook(_))
        ));
        assert!(!service.status_at(user.id, now).await.unwrap().active);

        let payload = checkout_payload("cs_1", user.id, i64::MAX);
        service
            .handle_stripe_webhook_at(&payload, Some(&sign(&payload, now)), now)
            .await
            .unwrap();
        let payload = checkout_payload("cs_2", user.id, 1);
        assert!(matches!(
            service
                .handle_stripe_webhook_at(&payload, Some(&sign(&payload, now)), now)
                .await,
            Err(AppError::InvalidWebhook(_))
        ));

        let status = service.status_at(user.id, now).await.unwrap();
        assert_eq!(status.amount_paid, i64::MAX);
        assert_eq!(status.end_date, Some(now + chrono::Duration::days(30)));
    }

    #[tokio::test]
    async fn test_missing_secret_is_internal() {
        let db = test_db().await;
        let service = PremiumService::new(
            db,
            PremiumSettings {
                webhook_secret: None,
                ..settings()
            },
        );
        assert!(matches!(
            service.handle_stripe_webhook(b"{}", Some("t=1,v1=00")).await,
            Err(AppError::Internal(_))
        ));
    }
}
