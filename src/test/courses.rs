#[cfg(test)]
mod tests {
    use crate::api::CourseDetailResponse;
    use crate::models::Course;
    use crate::test::test_utils::{
        bearer, create_standard_test_db, login_test_user, setup_test_client,
    };
    use rocket::http::{ContentType, Status};
    use serde_json::{Value, json};

    fn standard_course_body(name: &str) -> Value {
        let holes: Vec<Value> = (1..=18)
            .map(|n| json!({ "hole_number": n, "par": 4, "stroke_index": n }))
            .collect();

        json!({
            "name": name,
            "country": "Australia",
            "city": "Sydney",
            "website": "https://example.com/golf",
            "tee_boxes": [
                { "name": "White", "course_rating": 71.3, "slope_rating": 125, "yardage": 6200 }
            ],
            "holes": holes
        })
    }

    #[rocket::async_test]
    async fn test_list_and_filter_courses() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        let response = client.get("/api/courses").dispatch().await;
        assert_eq!(response.status(), Status::Ok);

        let body = response.into_string().await.unwrap();
        let courses: Vec<Course> = serde_json::from_str(&body).unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].name, "Pebble Creek");

        let response = client.get("/api/courses?country=Norway").dispatch().await;
        let body = response.into_string().await.unwrap();
        let courses: Vec<Course> = serde_json::from_str(&body).unwrap();
        assert!(courses.is_empty());

        let response = client.get("/api/courses?search=pebble").dispatch().await;
        let body = response.into_string().await.unwrap();
        let courses: Vec<Course> = serde_json::from_str(&body).unwrap();
        assert_eq!(courses.len(), 1);
    }

    #[rocket::async_test]
    async fn test_get_course_detail() {
        let test_db = create_standard_test_db().await;
        let (client, test_db) = setup_test_client(test_db).await;

        let course_id = test_db.course_id("Pebble Creek").unwrap();

        let response = client
            .get(format!("/api/courses/{}", course_id))
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Ok);

        let body = response.into_string().await.unwrap();
        let detail: CourseDetailResponse = serde_json::from_str(&body).unwrap();

        assert_eq!(detail.course.name, "Pebble Creek");
        assert_eq!(detail.tee_boxes.len(), 2);
        assert_eq!(detail.holes.len(), 18);
        assert!(detail.attachments.is_empty());
    }

    #[rocket::async_test]
    async fn test_get_missing_course() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        let response = client.get("/api/courses/9999").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
    }

    #[rocket::async_test]
    async fn test_create_course_requires_auth() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        let response = client
            .post("/api/courses")
            .header(ContentType::JSON)
            .body(standard_course_body("Anonymous Course").to_string())
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Unauthorized);
    }

    #[rocket::async_test]
    async fn test_player_creates_course() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        let token = login_test_user(&client, "player_user", "password123").await;

        let response = client
            .post("/api/courses")
            .header(ContentType::JSON)
            .header(bearer(&token))
            .body(standard_course_body("Royal Sydney").to_string())
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Created);

        let body = response.into_string().await.unwrap();
        let created: Value = serde_json::from_str(&body).unwrap();
        let id = created["id"].as_i64().unwrap();

        let response = client.get(format!("/api/courses/{}", id)).dispatch().await;
        let body = response.into_string().await.unwrap();
        let detail: CourseDetailResponse = serde_json::from_str(&body).unwrap();

        assert_eq!(detail.course.name, "Royal Sydney");
        assert_eq!(detail.holes.len(), 18);
    }

    #[rocket::async_test]
    async fn test_create_course_rejects_bad_holes() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        let token = login_test_user(&client, "player_user", "password123").await;

        // Seventeen holes.
        let mut body = standard_course_body("Short Course");
        body["holes"].as_array_mut().unwrap().pop();

        let response = client
            .post("/api/courses")
            .header(ContentType::JSON)
            .header(bearer(&token))
            .body(body.to_string())
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);

        // No partial rows survive a failed create.
        let response = client.get("/api/courses").dispatch().await;
        let body = response.into_string().await.unwrap();
        let courses: Vec<Course> = serde_json::from_str(&body).unwrap();
        assert_eq!(courses.len(), 1);

        // Eighteen holes but a duplicated hole number.
        let mut body = standard_course_body("Duped Course");
        body["holes"][17]["hole_number"] = json!(1);

        let response = client
            .post("/api/courses")
            .header(ContentType::JSON)
            .header(bearer(&token))
            .body(body.to_string())
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);

        let body = response.into_string().await.unwrap();
        let error: Value = serde_json::from_str(&body).unwrap();
        assert!(error["errors"]["holes"].is_array());
    }

    #[rocket::async_test]
    async fn test_create_course_rejects_bad_tee_boxes() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        let token = login_test_user(&client, "player_user", "password123").await;

        let mut body = standard_course_body("No Tees");
        body["tee_boxes"] = json!([]);

        let response = client
            .post("/api/courses")
            .header(ContentType::JSON)
            .header(bearer(&token))
            .body(body.to_string())
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);
    }

    fn multipart_file(boundary: &str, file_name: &str, content: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
                file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
        body
    }

    #[rocket::async_test]
    async fn test_attachment_upload_and_limit() {
        let test_db = create_standard_test_db().await;
        let (client, test_db) = setup_test_client(test_db).await;

        let course_id = test_db.course_id("Pebble Creek").unwrap();
        let token = login_test_user(&client, "player_user", "password123").await;

        let boundary = "X-FAIRWAY-BOUNDARY";
        let content_type = ContentType::parse_flexible(&format!(
            "multipart/form-data; boundary={}",
            boundary
        ))
        .unwrap();

        for n in 0..3 {
            let response = client
                .post(format!("/api/courses/{}/attachments", course_id))
                .header(content_type.clone())
                .header(bearer(&token))
                .body(multipart_file(boundary, &format!("scorecard-{}.png", n), b"png-bytes"))
                .dispatch()
                .await;

            assert_eq!(response.status(), Status::Created, "upload {} failed", n);
        }

        // Fourth upload exceeds the per-course limit.
        let response = client
            .post(format!("/api/courses/{}/attachments", course_id))
            .header(content_type.clone())
            .header(bearer(&token))
            .body(multipart_file(boundary, "one-too-many.png", b"png-bytes"))
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);

        let response = client
            .get(format!("/api/courses/{}", course_id))
            .dispatch()
            .await;
        let body = response.into_string().await.unwrap();
        let detail: CourseDetailResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(detail.attachments.len(), 3);
    }

    #[rocket::async_test]
    async fn test_attachment_requires_auth() {
        let test_db = create_standard_test_db().await;
        let (client, test_db) = setup_test_client(test_db).await;

        let course_id = test_db.course_id("Pebble Creek").unwrap();

        let boundary = "X-FAIRWAY-BOUNDARY";
        let content_type = ContentType::parse_flexible(&format!(
            "multipart/form-data; boundary={}",
            boundary
        ))
        .unwrap();

        let response = client
            .post(format!("/api/courses/{}/attachments", course_id))
            .header(content_type)
            .body(multipart_file(boundary, "scorecard.png", b"png-bytes"))
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Unauthorized);
    }
}
