use crate::user_directory::UserDirectory;
use crate::user_record::FilteredUser;

fn user(login: &str) -> FilteredUser {
    FilteredUser {
        login: login.to_string(),
        id: login.len() as u64,
        created_at: "2020-06-01T12:00:00Z".to_string(),
        avatar_url: "https://example.com/a.png".to_string(),
        bio: "hello".to_string(),
    }
}

#[test]
fn find_is_exact_and_returns_none_for_unknown_logins() {
    let directory = UserDirectory::new(vec![user("Alice"), user("Bob")]);

    assert_eq!(directory.find("Alice").unwrap().login, "Alice");
    assert!(directory.find("alice").is_none());
    assert!(directory.find("nobody").is_none());
}

#[test]
fn search_is_a_case_insensitive_substring_match() {
    let directory = UserDirectory::new(vec![user("Alice"), user("Bob"), user("rosemary")]);

    let hits = directory.search("LI");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].login, "Alice");

    let hits = directory.search("SE");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].login, "rosemary");

    assert!(directory.search("zzz").is_empty());
}

#[test]
fn empty_query_matches_everything() {
    let directory = UserDirectory::new(vec![user("Alice"), user("Bob")]);

    assert_eq!(directory.search("").len(), 2);
}
