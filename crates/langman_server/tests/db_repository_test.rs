//! Tests for database repository operations.

use chrono::{Duration, Utc};
use langman_core::{GuessState, Language};
use tempfile::NamedTempFile;

use langman_server::{
    DbError, DbErrorKind, FinishedGame, GameRepository, GameUpdate, NewGame, NewUser, Usage,
    UsageRepository, user_id_for,
};

/// Creates temporary database files with both schemas applied. The file
/// handles must stay in scope to keep the files alive.
fn setup_test_dbs() -> (NamedTempFile, NamedTempFile, UsageRepository, GameRepository) {
    let usage_file = NamedTempFile::new().expect("Failed to create temp file");
    let games_file = NamedTempFile::new().expect("Failed to create temp file");

    let usages = UsageRepository::new(usage_file.path().to_str().expect("Invalid path").to_string())
        .expect("Failed to create usage repository");
    usages.run_migrations().expect("Usage migrations failed");

    let games = GameRepository::new(games_file.path().to_str().expect("Invalid path").to_string())
        .expect("Failed to create game repository");
    games.run_migrations().expect("Games migrations failed");

    (usage_file, games_file, usages, games)
}

fn sample_usages() -> Vec<Usage> {
    vec![
        Usage::new(1, "es".into(), "gato".into(), "El {} duerme.".into(), "test".into()),
        Usage::new(2, "es".into(), "perro".into(), "El {} ladra.".into(), "test".into()),
        Usage::new(3, "fr".into(), "chat".into(), "Le {} dort.".into(), "test".into()),
    ]
}

fn create_player(games: &GameRepository, name: &str) -> String {
    let user = games
        .create_user(NewUser::new(
            user_id_for(name),
            name.to_string(),
            Utc::now().naive_utc(),
        ))
        .expect("Create user failed");
    user.user_id().clone()
}

#[test]
fn test_empty_path_rejected() {
    assert!(UsageRepository::new(String::new()).is_err());
    assert!(GameRepository::new("  ".to_string()).is_err());
}

#[test]
fn test_migrations_are_idempotent() {
    let (_u, _g, usages, games) = setup_test_dbs();
    usages.run_migrations().expect("Second usage migration failed");
    games.run_migrations().expect("Second games migration failed");
}

#[test]
fn test_insert_and_count_usages() {
    let (_u, _g, usages, _games) = setup_test_dbs();
    assert_eq!(usages.count().expect("Count failed"), 0);

    let inserted = usages.insert_usages(&sample_usages()).expect("Insert failed");
    assert_eq!(inserted, 3);
    assert_eq!(usages.count().expect("Count failed"), 3);
}

#[test]
fn test_duplicate_usage_id_rolls_back() {
    let (_u, _g, usages, _games) = setup_test_dbs();
    let mut rows = sample_usages();
    rows.push(Usage::new(1, "en".into(), "dup".into(), "{}".into(), "test".into()));

    assert!(usages.insert_usages(&rows).is_err());
    assert_eq!(usages.count().expect("Count failed"), 0);
}

#[test]
fn test_get_usage() {
    let (_u, _g, usages, _games) = setup_test_dbs();
    usages.insert_usages(&sample_usages()).expect("Insert failed");

    let usage = usages.get_usage(3).expect("Query failed").expect("Usage missing");
    assert_eq!(usage.secret_word(), "chat");
    assert_eq!(usage.parse_language().expect("Language"), Language::Fr);
    assert_eq!(usage.render("____"), "Le ____ dort.");

    assert!(usages.get_usage(99).expect("Query failed").is_none());
}

#[test]
fn test_random_usage_respects_language() {
    let (_u, _g, usages, _games) = setup_test_dbs();
    usages.insert_usages(&sample_usages()).expect("Insert failed");

    for _ in 0..20 {
        let usage = usages
            .random_usage(Language::Es)
            .expect("Query failed")
            .expect("Spanish usage expected");
        assert_eq!(usage.language(), "es");
    }

    let french = usages
        .random_usage(Language::Fr)
        .expect("Query failed")
        .expect("French usage expected");
    assert_eq!(*french.usage_id(), 3);

    assert!(usages.random_usage(Language::En).expect("Query failed").is_none());
}

#[test]
fn test_create_and_get_user() {
    let (_u, _g, _usages, games) = setup_test_dbs();
    let user_id = create_player(&games, "Alice");
    assert_eq!(user_id, user_id_for("Alice"));

    let user = games.get_user(&user_id).expect("Query failed").expect("User missing");
    assert_eq!(user.user_name(), "Alice");
    assert_eq!(*user.num_games(), 0);
    assert_eq!(user.win_rate(), 0.0);

    assert!(games.get_user("nope").expect("Query failed").is_none());
}

#[test]
fn test_create_user_duplicate_id_fails() {
    let (_u, _g, _usages, games) = setup_test_dbs();
    create_player(&games, "Bob");
    let result = games.create_user(NewUser::new(
        user_id_for("Bob"),
        "Bob".to_string(),
        Utc::now().naive_utc(),
    ));
    let err = result.expect_err("Duplicate user should fail");
    assert!(err.is_unique_violation());
}

#[test]
fn test_create_get_delete_game() {
    let (_u, _g, _usages, games) = setup_test_dbs();
    let player = create_player(&games, "Carol");
    let usage = &sample_usages()[0];

    let game = games
        .create_game(NewGame::start(
            "game-1".to_string(),
            player.clone(),
            usage,
            Utc::now().naive_utc(),
        ))
        .expect("Create game failed");
    assert_eq!(game.reveal_word(), "____");
    assert_eq!(game.guessed(), "");
    assert_eq!(*game.bad_guesses(), 0);
    assert!(game.end_time().is_none());

    let (loaded, user) = games
        .get_game_with_player("game-1")
        .expect("Query failed")
        .expect("Game missing");
    assert_eq!(loaded.game_id(), "game-1");
    assert_eq!(user.user_name(), "Carol");

    assert!(games.delete_game("game-1").expect("Delete failed"));
    assert!(!games.delete_game("game-1").expect("Delete failed"));
    assert!(games.get_game("game-1").expect("Query failed").is_none());
}

#[test]
fn test_update_game_without_finish_leaves_user() {
    let (_u, _g, _usages, games) = setup_test_dbs();
    let player = create_player(&games, "Dave");
    games
        .create_game(NewGame::start(
            "game-2".to_string(),
            player.clone(),
            &sample_usages()[0],
            Utc::now().naive_utc(),
        ))
        .expect("Create game failed");

    let state = GuessState::from_parts("a".to_string(), "_a__".to_string(), 0);
    let updated = games
        .update_game("game-2", &GameUpdate::from_state(&state, None), None)
        .expect("Update failed");
    assert_eq!(updated.reveal_word(), "_a__");
    assert_eq!(updated.guessed(), "a");
    assert!(updated.end_time().is_none());

    let user = games.get_user(&player).expect("Query failed").expect("User missing");
    assert_eq!(*user.num_games(), 0);
}

#[test]
fn test_update_game_finish_updates_aggregates() {
    let (_u, _g, _usages, games) = setup_test_dbs();
    let player = create_player(&games, "Eve");
    let start = Utc::now().naive_utc() - Duration::seconds(90);

    for (game_id, won) in [("won-1", true), ("won-2", true), ("lost-1", false)] {
        games
            .create_game(NewGame::start(
                game_id.to_string(),
                player.clone(),
                &sample_usages()[0],
                start,
            ))
            .expect("Create game failed");

        let end = start + Duration::seconds(30);
        let state = GuessState::from_parts("agto".to_string(), "gato".to_string(), 0);
        let updated = games
            .update_game(
                game_id,
                &GameUpdate::from_state(&state, Some(end)),
                Some(FinishedGame::new(won, 30)),
            )
            .expect("Update failed");
        assert_eq!(*updated.end_time(), Some(end));
    }

    let user = games.get_user(&player).expect("Query failed").expect("User missing");
    assert_eq!(*user.num_games(), 3);
    assert_eq!(*user.num_won(), 2);
    assert_eq!(*user.num_lost(), 1);
    assert_eq!(*user.total_time(), 90);
    assert!((user.win_rate() - 66.666).abs() < 0.01);
}

#[test]
fn test_update_missing_game_fails() {
    let (_u, _g, _usages, games) = setup_test_dbs();
    let state = GuessState::new("gato");
    let err = games
        .update_game("missing", &GameUpdate::from_state(&state, None), None)
        .expect_err("Update of missing game should fail");
    assert_eq!(err.kind, DbErrorKind::NotFound);
}

#[test]
fn test_modify_game_reads_and_writes() {
    let (_u, _g, _usages, games) = setup_test_dbs();
    let player = create_player(&games, "Gina");
    let usage = &sample_usages()[0];
    games
        .create_game(NewGame::start(
            "game-3".to_string(),
            player,
            usage,
            Utc::now().naive_utc(),
        ))
        .expect("Create game failed");

    let updated = games
        .modify_game("game-3", |current| {
            assert_eq!(current.reveal_word(), "____");
            let state = GuessState::from_parts("g".to_string(), "g___".to_string(), 0);
            Ok::<_, DbError>((GameUpdate::from_state(&state, None), None))
        })
        .expect("Modify failed")
        .expect("Game missing");
    assert_eq!(updated.reveal_word(), "g___");

    let missing = games
        .modify_game("missing", |_| -> Result<_, DbError> {
            panic!("apply must not run for a missing game")
        })
        .expect("Modify failed");
    assert!(missing.is_none());
}

#[test]
fn test_modify_game_failure_writes_nothing() {
    let (_u, _g, _usages, games) = setup_test_dbs();
    let player = create_player(&games, "Hugo");
    games
        .create_game(NewGame::start(
            "game-4".to_string(),
            player,
            &sample_usages()[0],
            Utc::now().naive_utc(),
        ))
        .expect("Create game failed");

    let result = games.modify_game("game-4", |_| -> Result<(GameUpdate, _), DbError> {
        Err(DbError::new("rejected"))
    });
    assert!(result.is_err());

    let game = games.get_game("game-4").expect("Query failed").expect("Game missing");
    assert_eq!(game.reveal_word(), "____");
    assert_eq!(game.guessed(), "");
}

#[test]
fn test_user_id_is_deterministic() {
    assert_eq!(user_id_for("Frank"), user_id_for("  Frank "));
    assert_ne!(user_id_for("Frank"), user_id_for("frank"));
    assert_eq!(user_id_for("Frank").len(), 32);
}
