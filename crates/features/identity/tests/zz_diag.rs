use ladle_database::Database;
use ladle_identity::UserRepository;

#[tokio::test]
async fn diag_create_user() {
    let db = Database::builder()
        .url("mem://")
        .session("ladle", "server_tests")
        .init()
        .await
        .expect("mem database");

    let repo = UserRepository::new(db);
    match repo.create("testuser@gmail.com", "Test Name", "fakehash").await {
        Ok(u) => eprintln!("DIAG OK: {u:?}"),
        Err(e) => eprintln!("DIAG ERR: {e:?}\nDISPLAY: {e}"),
    }
}
