use axum::response::Html;

const HOME_PAGE: &str = r#"<html>
    <head><title>Weight Prediction API</title></head>
    <body>
        <h1>Welcome to the Weight Prediction API</h1>
        <p>Use the <strong>/predict</strong> endpoint with a POST request to make predictions.</p>
    </body>
</html>
"#;

pub async fn home() -> Html<&'static str> {
    Html(HOME_PAGE)
}
