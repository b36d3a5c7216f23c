mod mocks;

use mocks::MockPhonebookRepository;
use phonebook_mcp_server::domain::{PersonId, PhoneId};
use phonebook_mcp_server::error::StorageError;
use phonebook_mcp_server::models::Person;
use phonebook_mcp_server::repositories::PhonebookRepository;

fn sample_person(id: &str, phones: &[(&str, &str)]) -> Person {
    phones.iter().fold(
        Person::new(PersonId::new(id).unwrap(), "Ivan", "Petrov", "Sergeevich"),
        |person, (phone_id, number)| person.with_phone(PhoneId::new(*phone_id).unwrap(), *number),
    )
}

#[tokio::test]
async fn test_mock_repository_load_all() {
    let repo = MockPhonebookRepository::new();
    repo.add_person(&sample_person("1", &[("1", "+100"), ("2", "200")]));
    repo.add_person(&sample_person("2", &[]));

    let persons = repo.load_all().await.unwrap();
    assert_eq!(persons.len(), 2);

    let first = persons
        .iter()
        .find(|p| p.id().map(PersonId::as_str) == Some("1"))
        .unwrap();
    assert_eq!(first.phone("2"), Some("200"));
    assert_eq!(repo.get_call_count("load_all"), 1);
}

#[tokio::test]
async fn test_mock_repository_phone_writes() {
    let repo = MockPhonebookRepository::new();
    repo.add_person(&sample_person("1", &[]));
    let person_id = PersonId::new("1").unwrap();
    let phone_id = PhoneId::new("1").unwrap();

    repo.insert_phone(&person_id, &phone_id, "111").await.unwrap();
    assert_eq!(repo.stored_number("1", "1").as_deref(), Some("111"));

    repo.update_phone(&person_id, &phone_id, "222").await.unwrap();
    assert_eq!(repo.stored_number("1", "1").as_deref(), Some("222"));

    repo.delete_phone(&person_id, &phone_id).await.unwrap();
    assert_eq!(repo.stored_phone_count("1"), 0);

    let err = repo.delete_phone(&person_id, &phone_id).await.unwrap_err();
    assert!(matches!(err, StorageError::RowMissing(_)));
}

#[tokio::test]
async fn test_mock_repository_duplicate_phone_rejected() {
    let repo = MockPhonebookRepository::new();
    repo.add_person(&sample_person("1", &[("1", "111")]));

    let result = repo
        .insert_phone(&PersonId::new("1").unwrap(), &PhoneId::new("1").unwrap(), "999")
        .await;
    assert!(result.is_err());
    assert_eq!(repo.stored_number("1", "1").as_deref(), Some("111"));
}

#[tokio::test]
async fn test_mock_repository_injected_failure_changes_nothing() {
    let repo = MockPhonebookRepository::new();
    repo.set_fail_writes(true);

    let result = repo.insert_person(&sample_person("1", &[("1", "111")])).await;
    assert!(matches!(result, Err(StorageError::Unavailable(_))));
    assert_eq!(repo.stored_person_count(), 0);
    assert_eq!(repo.get_call_count("insert_person"), 1);

    repo.set_fail_writes(false);
    repo.insert_person(&sample_person("1", &[("1", "111")]))
        .await
        .unwrap();
    assert_eq!(repo.stored_person_count(), 1);
}

#[tokio::test]
async fn test_mock_repository_delete_person_removes_phones() {
    let repo = MockPhonebookRepository::new();
    repo.add_person(&sample_person("7", &[("1", "111"), ("2", "222")]));

    repo.delete_person(&PersonId::new("7").unwrap()).await.unwrap();
    assert_eq!(repo.stored_person_count(), 0);
    assert_eq!(repo.stored_phone_count("7"), 0);

    repo.reset_call_counts();
    assert_eq!(repo.get_call_count("delete_person"), 0);
}
