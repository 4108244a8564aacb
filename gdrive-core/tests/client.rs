use gdrive_core::{DriveClient, DriveError, NewFile, PageRequest};
use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{
    body_string_contains, header, header_regex, method, path, query_param, query_param_is_missing,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn page_request(query: &str, token: Option<&str>) -> PageRequest {
    PageRequest {
        query: query.into(),
        fields: "nextPageToken,files(id,name,mimeType)".into(),
        page_size: 50,
        page_token: token.map(str::to_string),
    }
}

#[tokio::test]
async fn list_files_sends_query_fields_and_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(header("authorization", "Bearer test-token"))
        .and(query_param("q", "'root' in parents"))
        .and(query_param("fields", "nextPageToken,files(id,name,mimeType)"))
        .and(query_param("pageSize", "50"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nextPageToken": "next-1",
            "files": [
                {
                    "id": "f1",
                    "name": "Reports",
                    "mimeType": "application/vnd.google-apps.folder"
                },
                {
                    "id": "f2",
                    "name": "a.pdf",
                    "mimeType": "application/pdf",
                    "size": "2048",
                    "modifiedTime": "2024-01-01T00:00:00.000Z"
                }
            ]
        })))
        .mount(&server)
        .await;

    let client = DriveClient::with_base_url(&server.uri(), "test-token").unwrap();
    let list = client
        .list_files(&page_request("'root' in parents", None))
        .await
        .unwrap();

    assert_eq!(list.next_page_token.as_deref(), Some("next-1"));
    assert_eq!(list.files.len(), 2);
    assert!(list.files[0].is_folder());
    assert_eq!(list.files[1].size, Some(2048));
}

#[tokio::test]
async fn list_files_omits_empty_query_and_forwards_page_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param_is_missing("q"))
        .and(query_param("pageToken", "next-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "files": [] })))
        .mount(&server)
        .await;

    let client = DriveClient::with_base_url(&server.uri(), "test-token").unwrap();
    let list = client
        .list_files(&page_request("", Some("next-1")))
        .await
        .unwrap();

    assert!(list.files.is_empty());
    assert!(list.next_page_token.is_none());
}

#[tokio::test]
async fn create_folder_posts_folder_metadata() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/drive/v3/files"))
        .and(query_param("fields", "id"))
        .and(body_string_contains("\"name\":\"Reports\""))
        .and(body_string_contains("application/vnd.google-apps.folder"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "new-folder" })))
        .mount(&server)
        .await;

    let client = DriveClient::with_base_url(&server.uri(), "test-token").unwrap();
    let id = client.create_folder("Reports").await.unwrap();

    assert_eq!(id, "new-folder");
}

#[tokio::test]
async fn create_folder_without_id_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/drive/v3/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = DriveClient::with_base_url(&server.uri(), "test-token").unwrap();
    let err = client.create_folder("Reports").await.unwrap_err();

    assert!(matches!(err, DriveError::MissingField("id")));
}

#[tokio::test]
async fn upload_file_sends_multipart_related_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload/drive/v3/files"))
        .and(query_param("uploadType", "multipart"))
        .and(header_regex("content-type", "^multipart/related; boundary="))
        .and(body_string_contains("\"parents\":[\"folder-1\"]"))
        .and(body_string_contains("Content-Type: application/pdf"))
        .and(body_string_contains("%PDF-1.4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "file-9" })))
        .mount(&server)
        .await;

    let client = DriveClient::with_base_url(&server.uri(), "test-token").unwrap();
    let id = client
        .upload_file(&NewFile {
            name: "report.pdf".into(),
            parent_id: "folder-1".into(),
            mime_type: "application/pdf".into(),
            content: b"%PDF-1.4".to_vec(),
        })
        .await
        .unwrap();

    assert_eq!(id, "file-9");
}

#[tokio::test]
async fn upload_boundary_does_not_collide_with_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload/drive/v3/files"))
        .and(header(
            "content-type",
            "multipart/related; boundary=gdrive_core_boundary_1",
        ))
        .and(body_string_contains("\r\n--gdrive_core_boundary_1--"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "file-10" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = DriveClient::with_base_url(&server.uri(), "test-token").unwrap();
    let id = client
        .upload_file(&NewFile {
            name: "mail.eml".into(),
            parent_id: "folder-1".into(),
            mime_type: "message/rfc822".into(),
            content: b"--gdrive_core_boundary_0\r\nnested part".to_vec(),
        })
        .await
        .unwrap();

    assert_eq!(id, "file-10");
}

#[tokio::test]
async fn base_url_path_prefix_is_preserved() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/proxy/gdrive/drive/v3/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "files": [] })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/proxy/gdrive/drive/v3/files/f1"))
        .and(query_param("alt", "media"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"abc".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let base = format!("{}/proxy/gdrive", server.uri());
    let client = DriveClient::with_base_url(&base, "test-token").unwrap();

    let list = client.list_files(&page_request("", None)).await.unwrap();
    let bytes = client.download_file("f1").await.unwrap();

    assert!(list.files.is_empty());
    assert_eq!(bytes, b"abc");
}

#[tokio::test]
async fn download_file_returns_media_bytes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files/file-1"))
        .and(query_param("alt", "media"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello"))
        .mount(&server)
        .await;

    let client = DriveClient::with_base_url(&server.uri(), "test-token").unwrap();
    let bytes = client.download_file("file-1").await.unwrap();

    assert_eq!(bytes, b"hello");
}

#[tokio::test]
async fn download_missing_file_reports_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("File not found"))
        .mount(&server)
        .await;

    let client = DriveClient::with_base_url(&server.uri(), "test-token").unwrap();
    let err = client.download_file("missing").await.unwrap_err();

    match err {
        DriveError::Api { status, body } => {
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body, "File not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn delete_file_accepts_no_content() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/drive/v3/files/file-1"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = DriveClient::with_base_url(&server.uri(), "test-token").unwrap();
    client.delete_file("file-1").await.unwrap();
}

#[tokio::test]
async fn delete_file_surfaces_forbidden_as_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/drive/v3/files/file-1"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = DriveClient::with_base_url(&server.uri(), "test-token").unwrap();
    let err = client.delete_file("file-1").await.unwrap_err();

    assert_eq!(
        err.classification(),
        Some(gdrive_core::ApiErrorClass::Auth)
    );
}
