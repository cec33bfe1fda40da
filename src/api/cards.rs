use chrono::NaiveDate;
use rocket::State;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};
use validator::Validate;

use crate::auth::{Permission, User};
use crate::db::{
    create_player_card, get_cards_for_user, get_recent_differentials, get_tee_box, get_user,
};
use crate::handicap;
use crate::models::PlayerCard;
use crate::validation::{AppErrorExt, JsonValidateExt, PermissionCheckExt, ValidationResponse};

#[derive(Deserialize, Validate, Clone)]
pub struct SubmitCardRequest {
    course_id: i64,
    tee_box_id: i64,
    played_on: NaiveDate,
    #[validate(length(equal = 18, message = "A card has exactly 18 hole scores"))]
    holes: Vec<i64>,
}

#[derive(Serialize, Deserialize)]
pub struct CardSubmittedResponse {
    pub id: i64,
    pub gross: i64,
    pub net: i64,
    pub differential: f64,
}

#[post("/cards", data = "<request>")]
pub async fn api_submit_card(
    request: Json<SubmitCardRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<CardSubmittedResponse>>, Custom<Json<ValidationResponse>>> {
    user.require_permission(Permission::SubmitCards)
        .validate_custom()?;

    let validated = request.validate_custom()?;

    if validated.holes.iter().any(|&s| !(1..=15).contains(&s)) {
        return Err(Custom(
            Status::BadRequest,
            Json(ValidationResponse::with_error(
                "holes",
                "Hole scores must be between 1 and 15",
            )),
        ));
    }

    let tee_box = get_tee_box(db, validated.tee_box_id)
        .await
        .validate_custom()?;

    if tee_box.course_id != validated.course_id {
        return Err(Custom(
            Status::BadRequest,
            Json(ValidationResponse::with_error(
                "tee_box_id",
                "Tee box does not belong to the selected course",
            )),
        ));
    }

    let mut holes = [0i64; 18];
    holes.copy_from_slice(&validated.holes);

    let gross: i64 = holes.iter().sum();
    let differential =
        handicap::score_differential(gross, tee_box.course_rating, tee_box.slope_rating);

    // Net is computed against the index as it stood before this round.
    let prior = get_recent_differentials(db, user.id, handicap::WINDOW as i64)
        .await
        .validate_custom()?;
    let net = handicap::net_score(gross, handicap::handicap_index(&prior));

    let id = create_player_card(
        db,
        user.id,
        validated.course_id,
        validated.tee_box_id,
        validated.played_on,
        &holes,
        gross,
        net,
        differential,
    )
    .await
    .validate_custom()?;

    Ok(Custom(
        Status::Created,
        Json(CardSubmittedResponse {
            id,
            gross,
            net,
            differential,
        }),
    ))
}

#[get("/cards")]
pub async fn api_get_cards(
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<PlayerCard>>, Status> {
    user.require_permission(Permission::ViewOwnCards)?;

    let cards = get_cards_for_user(db, user.id).await?;

    Ok(Json(cards))
}

#[get("/players/<id>/cards")]
pub async fn api_get_player_cards(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<PlayerCard>>, Status> {
    if id != user.id {
        user.require_permission(Permission::ViewAllPlayers)?;
    }

    get_user(db, id).await?;
    let cards = get_cards_for_user(db, id).await?;

    Ok(Json(cards))
}

#[derive(Serialize, Deserialize)]
pub struct HandicapResponse {
    pub handicap_index: Option<f64>,
    pub rounds_recorded: usize,
}

#[get("/handicap")]
pub async fn api_get_handicap(
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<HandicapResponse>, Status> {
    let differentials = get_recent_differentials(db, user.id, handicap::WINDOW as i64).await?;

    Ok(Json(HandicapResponse {
        handicap_index: handicap::handicap_index(&differentials),
        rounds_recorded: differentials.len(),
    }))
}

#[get("/players/<id>/handicap")]
pub async fn api_get_player_handicap(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<HandicapResponse>, Status> {
    if id != user.id {
        user.require_permission(Permission::ViewAllPlayers)?;
    }

    get_user(db, id).await?;
    let differentials = get_recent_differentials(db, id, handicap::WINDOW as i64).await?;

    Ok(Json(HandicapResponse {
        handicap_index: handicap::handicap_index(&differentials),
        rounds_recorded: differentials.len(),
    }))
}
