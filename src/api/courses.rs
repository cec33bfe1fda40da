use std::collections::HashSet;

use rocket::State;
use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{Permission, User};
use crate::config::AppConfig;
use crate::db::{
    NewCourseHole, NewTeeBox, add_course_attachment, count_course_attachments, create_course,
    get_course, get_course_attachments, get_course_holes, get_course_tee_boxes, list_courses,
};
use crate::models::{Course, CourseAttachment, CourseHole, TeeBox};
use crate::error::AppError;
use crate::validation::{
    AppErrorExt, JsonValidateExt, PermissionCheckExt, ToValidationResponse, ValidationResponse,
};

pub const MAX_ATTACHMENTS_PER_COURSE: i64 = 3;

#[derive(FromForm)]
pub struct CourseQueryParams {
    country: Option<String>,
    search: Option<String>,
}

#[get("/courses?<params..>")]
pub async fn api_list_courses(
    params: CourseQueryParams,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<Course>>, Status> {
    let courses = list_courses(db, params.country.as_deref(), params.search.as_deref()).await?;

    Ok(Json(courses))
}

#[derive(Serialize, Deserialize)]
pub struct CourseDetailResponse {
    pub course: Course,
    pub tee_boxes: Vec<TeeBox>,
    pub holes: Vec<CourseHole>,
    pub attachments: Vec<CourseAttachment>,
}

#[get("/courses/<id>")]
pub async fn api_get_course(
    id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<CourseDetailResponse>, Status> {
    let course = get_course(db, id).await?;
    let tee_boxes = get_course_tee_boxes(db, id).await?;
    let holes = get_course_holes(db, id).await?;
    let attachments = get_course_attachments(db, id).await?;

    Ok(Json(CourseDetailResponse {
        course,
        tee_boxes,
        holes,
        attachments,
    }))
}

#[derive(Serialize, Deserialize, Validate, Clone)]
pub struct TeeBoxInput {
    #[validate(length(min = 1, max = 32, message = "Tee box name must be 1 to 32 characters"))]
    name: String,
    #[validate(range(min = 40.0, max = 90.0, message = "Course rating must be between 40 and 90"))]
    course_rating: f64,
    #[validate(range(min = 55, max = 155, message = "Slope rating must be between 55 and 155"))]
    slope_rating: i64,
    #[validate(range(min = 1000, max = 8500, message = "Yardage must be between 1000 and 8500"))]
    yardage: Option<i64>,
}

#[derive(Serialize, Deserialize, Validate, Clone)]
pub struct CourseHoleInput {
    #[validate(range(min = 1, max = 18, message = "Hole number must be between 1 and 18"))]
    hole_number: i64,
    #[validate(range(min = 3, max = 6, message = "Par must be between 3 and 6"))]
    par: i64,
    #[validate(range(min = 1, max = 18, message = "Stroke index must be between 1 and 18"))]
    stroke_index: i64,
}

#[derive(Deserialize, Validate, Clone)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 128, message = "Course name must be 1 to 128 characters"))]
    name: String,
    #[validate(length(min = 1, max = 64, message = "Country must be 1 to 64 characters"))]
    country: String,
    #[validate(length(min = 1, max = 64, message = "City must be 1 to 64 characters"))]
    city: String,
    #[validate(url(message = "Website must be a valid URL"))]
    website: Option<String>,
    #[validate(
        length(min = 1, max = 6, message = "A course has 1 to 6 tee boxes"),
        nested
    )]
    tee_boxes: Vec<TeeBoxInput>,
    #[validate(length(equal = 18, message = "A course has exactly 18 holes"), nested)]
    holes: Vec<CourseHoleInput>,
}

#[derive(Serialize, Deserialize)]
pub struct CourseCreatedResponse {
    pub id: i64,
}

#[post("/courses", data = "<request>")]
pub async fn api_create_course(
    request: Json<CreateCourseRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<CourseCreatedResponse>>, Custom<Json<ValidationResponse>>> {
    user.require_permission(Permission::CreateCourses)
        .validate_custom()?;

    let validated = request.validate_custom()?;

    // Hole numbers must cover 1..18 with no repeats; per-field range checks
    // alone would accept eighteen copies of hole 1.
    let hole_numbers: HashSet<i64> = validated.holes.iter().map(|h| h.hole_number).collect();
    if hole_numbers.len() != validated.holes.len() {
        return Err(Custom(
            Status::BadRequest,
            Json(ValidationResponse::with_error(
                "holes",
                "Hole numbers must be unique",
            )),
        ));
    }

    let tee_boxes: Vec<NewTeeBox> = validated
        .tee_boxes
        .iter()
        .map(|t| NewTeeBox {
            name: t.name.clone(),
            course_rating: t.course_rating,
            slope_rating: t.slope_rating,
            yardage: t.yardage,
        })
        .collect();

    let holes: Vec<NewCourseHole> = validated
        .holes
        .iter()
        .map(|h| NewCourseHole {
            hole_number: h.hole_number,
            par: h.par,
            stroke_index: h.stroke_index,
        })
        .collect();

    let id = create_course(
        db,
        user.id,
        &validated.name,
        &validated.country,
        &validated.city,
        validated.website.as_deref(),
        &tee_boxes,
        &holes,
    )
    .await
    .validate_custom()?;

    Ok(Custom(Status::Created, Json(CourseCreatedResponse { id })))
}

#[derive(FromForm)]
pub struct AttachmentUpload<'r> {
    file: TempFile<'r>,
}

#[derive(Serialize, Deserialize)]
pub struct AttachmentResponse {
    pub id: i64,
    pub stored_name: String,
}

#[post("/courses/<id>/attachments", data = "<upload>")]
pub async fn api_upload_attachment(
    id: i64,
    upload: Form<AttachmentUpload<'_>>,
    user: User,
    db: &State<Pool<Sqlite>>,
    config: &State<AppConfig>,
) -> Result<Custom<Json<AttachmentResponse>>, Custom<Json<ValidationResponse>>> {
    user.require_permission(Permission::UploadAttachments)
        .validate_custom()?;

    get_course(db, id).await.validate_custom()?;

    let existing = count_course_attachments(db, id).await.validate_custom()?;
    if existing >= MAX_ATTACHMENTS_PER_COURSE {
        return Err(Custom(
            Status::BadRequest,
            Json(ValidationResponse::with_error(
                "attachments",
                "A course can have at most 3 attachments",
            )),
        ));
    }

    let mut upload = upload.into_inner();

    let file_name = upload.file.name().unwrap_or("attachment").to_string();
    let content_type = upload.file.content_type().map(|c| c.to_string());
    let extension = upload
        .file
        .content_type()
        .and_then(|c| c.extension())
        .map(|ext| ext.to_string())
        .unwrap_or_else(|| "bin".to_string());

    let stored_name = format!("{}.{}", Uuid::new_v4(), extension);
    let destination = config.uploads_dir.join(&stored_name);

    rocket::tokio::fs::create_dir_all(&config.uploads_dir)
        .await
        .map_err(|e| AppError::from(e).to_validation_response())?;

    upload
        .file
        .copy_to(&destination)
        .await
        .map_err(|e| AppError::from(e).to_validation_response())?;

    let attachment_id = add_course_attachment(
        db,
        id,
        &file_name,
        &stored_name,
        content_type.as_deref(),
        user.id,
    )
    .await
    .validate_custom()?;

    Ok(Custom(
        Status::Created,
        Json(AttachmentResponse {
            id: attachment_id,
            stored_name,
        }),
    ))
}
