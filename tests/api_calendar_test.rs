//! Integration tests for the calendar download endpoint

mod test_utils;

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use serial_test::serial;
    use tower::util::ServiceExt;

    use crate::test_utils::{body_to_json, body_to_string, test_app};

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    /// Tests both events come back in one file
    #[tokio::test]
    #[serial]
    async fn it_downloads_both_events() {
        let app = test_app();

        let response = app
            .oneshot(get("/api/calendar?civil=true&lunch=true"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/calendar; charset=utf-8"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"boda-natalia-jan.ics\""
        );
        let body = body_to_string(response.into_body()).await;
        assert_eq!(body.matches("BEGIN:VEVENT").count(), 2);
    }

    /// Tests a single selected event
    #[tokio::test]
    #[serial]
    async fn it_downloads_single_event() {
        let app = test_app();

        let response = app.oneshot(get("/api/calendar?lunch=true")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"boda-celebracion.ics\""
        );
        let body = body_to_string(response.into_body()).await;
        assert_eq!(body.matches("BEGIN:VEVENT").count(), 1);
        assert!(body.contains("Salón Los Jardines"));
    }

    /// Tests nothing selected is refused
    #[tokio::test]
    #[serial]
    async fn it_returns_400_without_events() {
        let app = test_app();

        let response = app
            .oneshot(get("/api/calendar?civil=false&lunch=false"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body["error"], "No hay eventos seleccionados");
    }
}
