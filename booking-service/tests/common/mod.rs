use booking_service::config::{
    AuthConfig, Config, DatabaseConfig, PricingConfig, RazorpayConfig, ServerConfig, SmtpConfig,
};
use booking_service::middleware::Claims;
use booking_service::models::{Course, Tutor};
use booking_service::Application;
use jsonwebtoken::{encode, EncodingKey, Header};
use mongodb::bson::DateTime;
use secrecy::Secret;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret";
pub const TEST_RAZORPAY_SECRET: &str = "test_key_secret";
pub const TEST_WEBHOOK_SECRET: &str = "test_webhook_secret";

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub db: mongodb::Database,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let db_name = format!("booking_test_{}", Uuid::new_v4());

        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Random port
            },
            database: DatabaseConfig {
                url: Secret::new(
                    std::env::var("TEST_MONGODB_URI")
                        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
                ),
                db_name: db_name.clone(),
            },
            auth: AuthConfig {
                jwt_secret: Secret::new(TEST_JWT_SECRET.to_string()),
            },
            pricing: PricingConfig {
                trial_fee_floor: 49.0,
                default_session_fee: 500.0,
            },
            razorpay: RazorpayConfig {
                key_id: "rzp_test_key".to_string(),
                key_secret: Secret::new(TEST_RAZORPAY_SECRET.to_string()),
                webhook_secret: Secret::new(TEST_WEBHOOK_SECRET.to_string()),
                api_base_url: "https://api.razorpay.com/v1".to_string(),
            },
            smtp: SmtpConfig {
                enabled: false,
                host: "localhost".to_string(),
                port: 587,
                user: String::new(),
                password: String::new(),
                from_email: "noreply@tutormitra.in".to_string(),
                from_name: "TutorMitra".to_string(),
            },
            service_name: "booking-service-test".to_string(),
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);
        let db = app.db().clone();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to come up.
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            db,
            client,
        }
    }

    /// Bearer token for a caller, signed the way the auth service does.
    pub fn token_for(&self, user_id: Uuid, email: &str) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            exp: now + 3600,
            iat: now,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
        )
        .expect("Failed to sign test token")
    }

    pub async fn seed_tutor(
        &self,
        user: Uuid,
        fee_per_hour: Option<f64>,
        trial_fee: Option<f64>,
    ) -> Tutor {
        let tutor = Tutor {
            id: Uuid::new_v4(),
            user,
            name: "Meera Nair".to_string(),
            email: "meera@example.com".to_string(),
            subjects: vec!["Chemistry".to_string()],
            fee_per_hour,
            trial_fee,
            created_at: DateTime::now(),
        };
        self.db
            .collection::<Tutor>("tutors")
            .insert_one(tutor.clone(), None)
            .await
            .expect("Failed to seed tutor");
        tutor
    }

    pub async fn seed_course(&self, tutor: Uuid, price: Option<f64>) -> Course {
        let course = Course {
            id: Uuid::new_v4(),
            tutor,
            title: "Organic Chemistry Crash Course".to_string(),
            price,
            created_at: DateTime::now(),
        };
        self.db
            .collection::<Course>("courses")
            .insert_one(course.clone(), None)
            .await
            .expect("Failed to seed course");
        course
    }

    /// Cleanup test database after test completes.
    pub async fn cleanup(&self) {
        self.db
            .drop(None)
            .await
            .expect("Failed to drop test database");
    }
}

/// Checkout signature the way Razorpay computes it.
pub fn checkout_signature(order_id: &str, payment_id: &str) -> String {
    hmac_hex(
        TEST_RAZORPAY_SECRET,
        &format!("{}|{}", order_id, payment_id),
    )
}

/// Webhook signature over the raw body.
pub fn webhook_signature(body: &str) -> String {
    hmac_hex(TEST_WEBHOOK_SECRET, body)
}

fn hmac_hex(secret: &str, payload: &str) -> String {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("Invalid key length");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
