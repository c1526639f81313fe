mod common;

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use actix_web::web::Data;
use common::{bearer, send, test_bootstrap, test_config, test_issue_token, TEST_ADMIN_EMAIL};
use serde_json::{json, Value};

fn hand(taker: &str, contract: &str, trump: &str, a: i32, b: i32) -> Value {
    json!({
        "taker_user_id": taker,
        "contract": contract,
        "trump": trump,
        "score_team_a": a,
        "score_team_b": b,
    })
}

#[actix_web::test]
async fn smoke_workflow() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    let app = actix_web::test::init_service(
        actix_web::App::new()
            .app_data(Data::new(db.clone()))
            .app_data(Data::new(test_config()))
            .configure(coinche_backend::configure_routes),
    )
    .await;

    // 1) Users are created on their first authenticated request
    let mut tokens = Vec::new();
    let mut ids = Vec::new();
    for (sub, email, name) in [
        ("alice", TEST_ADMIN_EMAIL, "Alice"),
        ("bob", "bob@example.com", "Bob"),
        ("chloe", "chloe@example.com", "Chloe"),
        ("david", "david@example.com", "David"),
        ("eve", "eve@example.com", "Eve"),
    ] {
        let token = test_issue_token(sub, email, Some(name), 3600);
        let req = TestRequest::get()
            .uri("/api/me")
            .insert_header(bearer(&token))
            .to_request();
        let (status, me) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["user"]["display_name"], name);
        ids.push(me["user"]["id"].as_str().unwrap().to_string());
        tokens.push(token);
    }
    let (alice, bob, chloe, david, eve) = (&ids[0], &ids[1], &ids[2], &ids[3], &ids[4]);
    let (alice_token, eve_token) = (&tokens[0], &tokens[4]);

    // 2) Create a game: Alice & Bob against Chloe & David
    let req = TestRequest::post()
        .uri("/api/games")
        .insert_header(bearer(alice_token))
        .set_json(json!({ "players": [alice, bob, chloe, david] }))
        .to_request();
    let (status, created) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["game"]["state"], "in_progress");
    assert_eq!(created["game"]["target_points"], 1000);
    assert_eq!(created["team_a"].as_array().unwrap().len(), 2);
    assert_eq!(created["team_b"][0]["name"], "Chloe");
    assert_eq!(created["can_add_hand"], true);
    let game_id = created["game"]["id"].as_str().unwrap().to_string();
    let hands_uri = format!("/api/games/{game_id}/hands");

    // 3) A player outside the game cannot add hands
    let req = TestRequest::post()
        .uri(&hands_uri)
        .insert_header(bearer(eve_token))
        .set_json(hand(alice, "80", "Coeur", 100, 62))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // 4) Alice takes 80 at Coeur with a belote and makes it
    let mut first = hand(alice, "80", "Coeur", 100, 62);
    first["belote_a"] = json!(1);
    let req = TestRequest::post()
        .uri(&hands_uri)
        .insert_header(bearer(alice_token))
        .set_json(&first)
        .to_request();
    let (status, detail) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(detail["hands"][0]["number"], 1);
    assert_eq!(detail["hands"][0]["score_a"], 200);
    assert_eq!(detail["hands"][0]["score_b"], 60);
    assert_eq!(detail["hands"][0]["taker_name"], "Alice");
    let first_hand_id = detail["hands"][0]["id"].as_str().unwrap().to_string();

    // 5) Chloe announces and makes a capot
    let req = TestRequest::post()
        .uri(&hands_uri)
        .insert_header(bearer(alice_token))
        .set_json(hand(chloe, "Capot", "Pique", 0, 162))
        .to_request();
    let (status, detail) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(detail["hands"][1]["score_b"], 500);
    assert_eq!(detail["hands"][1]["capot_team"], "B");
    assert_eq!(detail["hands"][1]["cumulative_a"], 200);
    assert_eq!(detail["hands"][1]["cumulative_b"], 560);
    assert_eq!(detail["game"]["score_a"], 200);
    assert_eq!(detail["game"]["score_b"], 560);
    let second_hand_id = detail["hands"][1]["id"].as_str().unwrap().to_string();

    // 6) Invalid hands are rejected with a stable code
    let mut sans_atout_belote = hand(alice, "90", "Sans atout", 100, 62);
    sans_atout_belote["belote_b"] = json!(1);
    for (body, code) in [
        (hand(alice, "85", "Coeur", 100, 62), "INVALID_CONTRACT"),
        (hand(alice, "80", "Joker", 100, 62), "INVALID_TRUMP"),
        (hand(alice, "80", "Coeur", 170, 0), "INVALID_PRE_SCORE"),
        (sans_atout_belote, "INVALID_BELOTE"),
        (hand(eve, "80", "Coeur", 100, 62), "INVALID_TAKER"),
    ] {
        let req = TestRequest::post()
            .uri(&hands_uri)
            .insert_header(bearer(alice_token))
            .set_json(&body)
            .to_request();
        let (status, error) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "expected {code}");
        assert_eq!(error["code"], code);
    }

    // 7) Editing the first hand as coinched doubles the taker's base score
    let mut coinched = first.clone();
    coinched["coinche"] = json!(true);
    let req = TestRequest::put()
        .uri(&format!("{hands_uri}/{first_hand_id}"))
        .insert_header(bearer(alice_token))
        .set_json(&coinched)
        .to_request();
    let (status, detail) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["hands"][0]["number"], 1);
    assert_eq!(detail["hands"][0]["score_a"], 380);
    assert_eq!(detail["game"]["score_a"], 380);
    assert_eq!(detail["game"]["score_b"], 560);

    // 8) Deleting the capot removes its points
    let req = TestRequest::delete()
        .uri(&format!("{hands_uri}/{second_hand_id}"))
        .insert_header(bearer(alice_token))
        .to_request();
    let (status, detail) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["hands"].as_array().unwrap().len(), 1);
    assert_eq!(detail["game"]["score_b"], 60);

    // 9) Lowering the target below a team's total finishes the game...
    let target_uri = format!("/api/games/{game_id}/target");
    let req = TestRequest::put()
        .uri(&target_uri)
        .insert_header(bearer(alice_token))
        .set_json(json!({ "target_points": 300 }))
        .to_request();
    let (status, detail) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["game"]["state"], "finished");
    assert_eq!(detail["can_add_hand"], false);

    let req = TestRequest::post()
        .uri(&hands_uri)
        .insert_header(bearer(alice_token))
        .set_json(hand(david, "80", "Coeur", 62, 100))
        .to_request();
    let (status, error) = send(&app, req).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["code"], "GAME_NOT_IN_PROGRESS");

    // ...and raising it again reopens it
    let req = TestRequest::put()
        .uri(&target_uri)
        .insert_header(bearer(alice_token))
        .set_json(json!({ "target_points": 1000 }))
        .to_request();
    let (status, detail) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["game"]["state"], "in_progress");

    let req = TestRequest::get()
        .uri("/api/me/games")
        .insert_header(bearer(alice_token))
        .to_request();
    let (status, mine) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine["games"].as_array().unwrap().len(), 1);

    // 10) A générale then a capot take team B past the target
    let mut generale = hand(david, "Générale", "Trèfle", 0, 162);
    generale["general"] = json!(true);
    let req = TestRequest::post()
        .uri(&hands_uri)
        .insert_header(bearer(alice_token))
        .set_json(&generale)
        .to_request();
    let (status, detail) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    // Numbering continues from the highest remaining hand
    assert_eq!(detail["hands"][1]["number"], 2);
    assert_eq!(detail["game"]["score_b"], 810);
    assert_eq!(detail["game"]["state"], "in_progress");

    let req = TestRequest::post()
        .uri(&hands_uri)
        .insert_header(bearer(alice_token))
        .set_json(hand(david, "Capot", "Trèfle", 0, 162))
        .to_request();
    let (status, detail) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(detail["game"]["score_a"], 380);
    assert_eq!(detail["game"]["score_b"], 1310);
    assert_eq!(detail["game"]["state"], "finished");

    // 11) Listings
    let req = TestRequest::get()
        .uri("/api/games")
        .insert_header(bearer(eve_token))
        .to_request();
    let (status, list) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let games = list["games"].as_array().unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0]["team_a"], json!(["Alice", "Bob"]));
    assert_eq!(games[0]["is_player_in_game"], false);

    let req = TestRequest::get()
        .uri("/api/me/games")
        .insert_header(bearer(alice_token))
        .to_request();
    let (_, mine) = send(&app, req).await;
    assert!(mine["games"].as_array().unwrap().is_empty());

    // 12) Only the creator or an admin can cancel or delete
    let game_uri = format!("/api/games/{game_id}");
    let req = TestRequest::post()
        .uri(&format!("{game_uri}/cancel"))
        .insert_header(bearer(eve_token))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = TestRequest::post()
        .uri(&format!("{game_uri}/cancel"))
        .insert_header(bearer(alice_token))
        .to_request();
    let (status, detail) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["game"]["state"], "cancelled");

    let req = TestRequest::put()
        .uri(&format!("{hands_uri}/{first_hand_id}"))
        .insert_header(bearer(alice_token))
        .set_json(&first)
        .to_request();
    let (status, error) = send(&app, req).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["code"], "GAME_CANCELLED");

    let req = TestRequest::delete()
        .uri(&game_uri)
        .insert_header(bearer(alice_token))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);

    let req = TestRequest::get()
        .uri(&game_uri)
        .insert_header(bearer(alice_token))
        .to_request();
    let (status, error) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["code"], "GAME_NOT_FOUND");

    Ok(())
}

#[actix_web::test]
async fn requests_without_token_are_rejected() {
    let db = test_bootstrap().await;
    let app = actix_web::test::init_service(
        actix_web::App::new()
            .app_data(Data::new(db.clone()))
            .app_data(Data::new(test_config()))
            .configure(coinche_backend::configure_routes),
    )
    .await;

    let req = TestRequest::get().uri("/api/games").to_request();
    let (status, error) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error["code"], "UNAUTHORIZED");

    let req = TestRequest::get()
        .uri("/api/games")
        .insert_header(("Authorization", "Bearer not-a-token"))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The root route stays public
    let req = TestRequest::get().uri("/").to_request();
    let res = actix_web::test::call_service(&app, req).await;
    assert!(res.status().is_success());
}
