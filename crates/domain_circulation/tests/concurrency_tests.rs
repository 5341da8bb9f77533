//! Concurrent borrow and return
//!
//! Many tasks race on one book or one loan through a shared service. The
//! ledger must never hand out more copies than exist, and a loan must be
//! credited back at most once.

use std::sync::Arc;

use domain_circulation::{CirculationError, CirculationService, InMemoryStore, NewBook, NewMember};

async fn setup(copies: i32) -> (CirculationService, core_kernel::BookId, core_kernel::MemberId) {
    let service = CirculationService::new(Arc::new(InMemoryStore::new()));
    let book = service
        .add_book(NewBook::new("Neuromancer", "William Gibson", "9780441569595", copies, copies))
        .await
        .unwrap();
    let member = service
        .add_member(NewMember::new("Case", "case@example.org"))
        .await
        .unwrap();
    (service, book.id, member.id)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_borrows_never_oversell() {
    const COPIES: i32 = 3;
    const CALLERS: usize = 16;

    let (service, book_id, member_id) = setup(COPIES).await;

    let handles: Vec<_> = (0..CALLERS)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.borrow_book(book_id, member_id, None).await })
        })
        .collect();

    let mut successes = 0;
    let mut unavailable = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(CirculationError::BookUnavailable { .. }) => unavailable += 1,
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    assert_eq!(successes, COPIES as usize);
    assert_eq!(unavailable, CALLERS - COPIES as usize);
    assert_eq!(service.get_book(book_id).await.unwrap().copies_available, 0);
    assert_eq!(service.list_loans().await.unwrap().len(), COPIES as usize);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_returns_credit_once() {
    let (service, book_id, member_id) = setup(2).await;
    let loan = service.borrow_book(book_id, member_id, None).await.unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.return_book(loan.id, None).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(CirculationError::AlreadyReturned { .. }) => {}
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(service.get_book(book_id).await.unwrap().copies_available, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_interleaved_borrow_and_return_keep_counts_consistent() {
    let (service, book_id, member_id) = setup(2).await;

    let handles: Vec<_> = (0..12)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move {
                if let Ok(loan) = service.borrow_book(book_id, member_id, None).await {
                    service.return_book(loan.id, None).await.unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }

    let book = service.get_book(book_id).await.unwrap();
    assert_eq!(book.copies_available, 2);
    assert!(service
        .list_loans()
        .await
        .unwrap()
        .iter()
        .all(|view| view.loan.returned_at.is_some()));
}
