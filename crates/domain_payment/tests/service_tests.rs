//! Application service tests against an in-memory repository

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use core_kernel::{Amount, FixedClock, Iban, IdempotencyKey, PaymentId};
use domain_payment::{
    NewPayment, Payment, PaymentError, PaymentRepository, PaymentService, PaymentStatus,
    RepositoryError, ServiceError,
};

/// Minimal port implementation backed by a map, mirroring the contract of
/// the real adapter: uniqueness enforced at save time, absence always an
/// error.
#[derive(Default)]
struct InMemoryRepository {
    rows: Mutex<HashMap<PaymentId, Payment>>,
}

#[async_trait]
impl PaymentRepository for InMemoryRepository {
    async fn save(&self, payment: &Payment) -> Result<(), RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        if rows
            .values()
            .any(|p| p.idempotency_key() == payment.idempotency_key())
        {
            return Err(RepositoryError::DuplicateIdempotencyKey(
                payment.idempotency_key().clone(),
            ));
        }
        rows.insert(payment.id(), payment.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &PaymentId) -> Result<Payment, RepositoryError> {
        self.rows
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(id))
    }

    async fn find_by_idempotency_key(
        &self,
        key: &IdempotencyKey,
    ) -> Result<Payment, RepositoryError> {
        self.rows
            .lock()
            .unwrap()
            .values()
            .find(|p| p.idempotency_key() == key)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(key))
    }

    async fn update_status(
        &self,
        id: &PaymentId,
        status: PaymentStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        let stored = rows.get_mut(id).ok_or_else(|| RepositoryError::not_found(id))?;
        let mut updated = stored.clone();
        match status {
            PaymentStatus::Processed => updated.mark_processed(updated_at).unwrap(),
            PaymentStatus::Failed => updated.mark_failed(updated_at).unwrap(),
            PaymentStatus::Pending => {}
        }
        *stored = updated;
        Ok(())
    }
}

fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

fn service() -> (PaymentService, Arc<InMemoryRepository>, Arc<FixedClock>) {
    let repository = Arc::new(InMemoryRepository::default());
    let clock = Arc::new(FixedClock::new(start_time()));
    let service = PaymentService::new(repository.clone(), clock.clone());
    (service, repository, clock)
}

fn request(key: &str) -> NewPayment {
    NewPayment {
        id: PaymentId::new(),
        debtor_iban: Iban::new("GB82WEST12345698765432").unwrap(),
        debtor_name: "John Doe".to_string(),
        creditor_iban: Iban::new("FR1420041010050500013M02606").unwrap(),
        creditor_name: "Jane Smith".to_string(),
        amount: Amount::from_cents(10050).unwrap(),
        idempotency_key: IdempotencyKey::new(key).unwrap(),
    }
}

#[tokio::test]
async fn submit_stores_pending_payment_with_clock_time() {
    let (service, _, _) = service();

    let payment = service.submit(request("abc123XYZ0")).await.unwrap();

    assert_eq!(payment.status(), PaymentStatus::Pending);
    assert_eq!(payment.created_at(), start_time());
    assert_eq!(payment.updated_at(), start_time());
}

#[tokio::test]
async fn submit_with_used_key_returns_original_aggregate() {
    let (service, _, _) = service();

    let first = service.submit(request("abc123XYZ0")).await.unwrap();
    let err = service.submit(request("abc123XYZ0")).await.unwrap_err();

    match err {
        ServiceError::DuplicateSubmission { existing, .. } => {
            assert_eq!(existing.id(), first.id());
        }
        other => panic!("expected DuplicateSubmission, got {other:?}"),
    }
}

#[tokio::test]
async fn ensure_idempotency_passes_fresh_key_and_flags_used_key() {
    let (service, _, _) = service();
    let key = IdempotencyKey::new("abc123XYZ0").unwrap();

    service.ensure_idempotency(&key).await.unwrap();

    let submitted = service.submit(request("abc123XYZ0")).await.unwrap();
    let err = service.ensure_idempotency(&key).await.unwrap_err();
    match err {
        ServiceError::DuplicateSubmission { existing, key: k } => {
            assert_eq!(existing.id(), submitted.id());
            assert_eq!(k, key);
        }
        other => panic!("expected DuplicateSubmission, got {other:?}"),
    }
}

#[tokio::test]
async fn status_update_transitions_and_persists() {
    let (service, repository, clock) = service();

    let payment = service.submit(request("abc123XYZ0")).await.unwrap();
    clock.advance(Duration::hours(1));

    service
        .process_status_update(&payment.id(), PaymentStatus::Processed)
        .await
        .unwrap();

    let stored = repository.find_by_id(&payment.id()).await.unwrap();
    assert_eq!(stored.status(), PaymentStatus::Processed);
    assert_eq!(stored.updated_at(), start_time() + Duration::hours(1));
}

#[tokio::test]
async fn status_update_on_terminal_payment_is_rejected() {
    let (service, _, _) = service();

    let payment = service.submit(request("abc123XYZ0")).await.unwrap();
    service
        .process_status_update(&payment.id(), PaymentStatus::Failed)
        .await
        .unwrap();

    let err = service
        .process_status_update(&payment.id(), PaymentStatus::Processed)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Domain(PaymentError::InvalidStatusTransition { .. })
    ));
}

#[tokio::test]
async fn status_update_to_pending_is_rejected() {
    let (service, _, _) = service();

    let payment = service.submit(request("abc123XYZ0")).await.unwrap();
    let err = service
        .process_status_update(&payment.id(), PaymentStatus::Pending)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Domain(PaymentError::InvalidStatusTransition { .. })
    ));
}

#[tokio::test]
async fn status_update_for_unknown_id_is_not_found() {
    let (service, _, _) = service();

    let err = service
        .process_status_update(&PaymentId::new(), PaymentStatus::Processed)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Repository(RepositoryError::NotFound(_))
    ));
}
