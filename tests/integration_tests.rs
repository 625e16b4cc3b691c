#[cfg(test)]
mod integration_tests {
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use tokio::runtime::Handle;
    use tokio_test::{assert_err, assert_ok};
    use verdi_sdk::client::signature;
    use verdi_sdk::client::IdGenerator;
    use verdi_sdk::dispatch::main_thread;
    use verdi_sdk::error::{ConfigurationError, TransportError, ValidationError};
    use verdi_sdk::facade::{DocumentScanner, NfcReadRequest, NfcReader, ScanMode, SelfieCapture};
    use verdi_sdk::session::{DocumentFields, VerdiListener, VerdiRegisterListener, VerdiResult};
    use verdi_sdk::transport::{Endpoint, Environment, HttpRequest, HttpResponse, Transport};
    use verdi_sdk::{
        codec::RegistrationResponse, Configuration, HostContext, Platform, Session, UserSession,
        VerdiError, Verdi, VerificationClient,
    };

    enum Reply {
        Http(u16, Option<&'static str>),
        Fail(TransportError),
    }

    #[derive(Default)]
    struct MockTransport {
        requests: Mutex<Vec<HttpRequest>>,
        replies: Mutex<HashMap<String, VecDeque<Reply>>>,
        cancels: AtomicUsize,
    }

    impl MockTransport {
        fn reply(&self, endpoint: Endpoint, reply: Reply) -> &Self {
            self.replies
                .lock()
                .unwrap()
                .entry(endpoint.url(Environment::Test))
                .or_default()
                .push_back(reply);
            self
        }

        fn ok(&self, endpoint: Endpoint, body: &'static str) -> &Self {
            self.reply(endpoint, Reply::Http(200, Some(body)))
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }

        fn calls(&self, endpoint: Endpoint) -> usize {
            let url = endpoint.url(Environment::Test);
            self.requests().iter().filter(|r| r.url == url).count()
        }

        fn body(&self, index: usize) -> serde_json::Value {
            serde_json::from_str(&self.requests()[index].body).unwrap()
        }
    }

    #[async_trait::async_trait]
    impl Transport for MockTransport {
        async fn post_json(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            let url = request.url.clone();
            self.requests.lock().unwrap().push(request);
            tokio::task::yield_now().await;

            let reply = self
                .replies
                .lock()
                .unwrap()
                .get_mut(&url)
                .and_then(|queue| queue.pop_front());

            match reply {
                Some(Reply::Http(status, body)) => Ok(HttpResponse {
                    status,
                    reason: if status == 200 { "OK" } else { "Service Unavailable" }.to_string(),
                    body: body.map(str::to_string),
                }),
                Some(Reply::Fail(e)) => Err(e),
                None => Err(TransportError::Other(format!("no reply scripted for {url}"))),
            }
        }

        fn cancel_all(&self) {
            self.cancels.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct SequentialIds(AtomicUsize);

    impl IdGenerator for SequentialIds {
        fn next_id(&self) -> String {
            format!("id-{}", self.0.fetch_add(1, Ordering::SeqCst) + 1)
        }
    }

    fn user() -> UserSession {
        UserSession {
            device_id: "device-1".to_string(),
            serial_number: "AA1234567".to_string(),
            personal_number: "30102901234567".to_string(),
            doc_type: "P".to_string(),
            birth_date: "01.02.1990".to_string(),
            date_of_expiry: "01.02.2030".to_string(),
            scanner_serial: String::new(),
            face_image: Some(b"face".to_vec()),
        }
    }

    fn client(app_id: &str, user: UserSession) -> (VerificationClient, Arc<MockTransport>) {
        let transport = Arc::new(MockTransport::default());
        let session = Arc::new(Session::new(Configuration::new(app_id), "Pixel 7", user));
        let client = VerificationClient::new(session, transport.clone())
            .with_id_generator(Arc::new(SequentialIds::default()));
        (client, transport)
    }

    #[tokio::test]
    async fn test_empty_app_id_fails_without_network() {
        let (client, transport) = client("", user());

        let err = client.check_app_id().await.unwrap_err();
        assert!(matches!(err, VerdiError::Configuration(ConfigurationError::AppIdEmpty)));

        let err = client.register_person().await.unwrap_err();
        assert!(matches!(err, VerdiError::Configuration(ConfigurationError::AppIdEmpty)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_register_checks_app_id_then_registers() {
        let (client, transport) = client("X", user());
        transport
            .ok(Endpoint::CheckAppId, r#"{"code":0,"message":"ok"}"#)
            .ok(
                Endpoint::Registration,
                r#"{"code":0,"message":"ok","personData":{"pinpp":"30102901234567","nameLatin":"ALI"}}"#,
            );

        let response = client.register_person().await.unwrap();
        assert_eq!(response.code, Some(0));
        assert_eq!(
            response.person_data.unwrap().name_latin.as_deref(),
            Some("ALI")
        );
        assert!(client.is_app_id_available());

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].url, Endpoint::CheckAppId.url(Environment::Test));
        assert_eq!(
            requests[0].header("Authorization"),
            Some("Basic dGVzdHJlYWQ6dGVzdHBhc3M=")
        );
        assert_eq!(requests[1].url, Endpoint::Registration.url(Environment::Test));
        assert_eq!(requests[1].header("Authorization"), None);
        assert_eq!(requests[1].header("Accept"), Some("application/json"));

        assert_eq!(transport.body(0)["appId"], "X");
        assert_eq!(transport.body(0)["requestId"], "id-1");

        let body = transport.body(1);
        assert_eq!(body["requestGuid"], "id-3");
        assert_eq!(body["clientPubKey"], "id-2");
        assert_eq!(
            body["signString"],
            signature::registration_signature("id-3", "AA1234567", "01.02.1990", "01.02.2030", "id-2")
        );
        assert_eq!(body["personPhoto"]["personPhoto"], "ZmFjZQ==");
        assert_eq!(body["personPhoto"]["photoFromCamera"], "ZmFjZQ==");
        assert_eq!(body["personPassport"]["passport"]["serialNumber"], "AA1234567");
        assert_eq!(body["mobileData"]["deviceModel"], "Pixel 7");
        assert_eq!(body["serviceInfo"]["ServiceInfo"]["scannerSerial"], "device-1");
    }

    #[tokio::test]
    async fn test_second_register_skips_app_id_check() {
        let (client, transport) = client("X", user());
        transport
            .ok(Endpoint::CheckAppId, r#"{"code":0}"#)
            .ok(Endpoint::Registration, r#"{"code":0}"#)
            .ok(Endpoint::Registration, r#"{"code":0}"#);

        assert_ok!(client.register_person().await);
        assert_ok!(client.register_person().await);
        assert_eq!(transport.calls(Endpoint::CheckAppId), 1);
        assert_eq!(transport.calls(Endpoint::Registration), 2);
    }

    #[tokio::test]
    async fn test_registration_error_code_is_classified() {
        let (client, transport) = client("X", user());
        transport
            .ok(Endpoint::CheckAppId, r#"{"code":0}"#)
            .ok(Endpoint::Registration, r#"{"code":17,"message":"Invalid document"}"#);

        let err = client.register_person().await.unwrap_err();
        assert!(matches!(err, VerdiError::Domain(_)));
        assert_eq!(err.response_code(), Some(17));
    }

    #[tokio::test]
    async fn test_failed_app_id_check_stops_and_is_retried_next_time() {
        let (client, transport) = client("X", user());
        transport
            .ok(Endpoint::CheckAppId, r#"{"code":1,"message":"unknown app"}"#)
            .ok(Endpoint::CheckAppId, r#"{"code":1,"message":"unknown app"}"#);

        assert_eq!(client.register_person().await.unwrap_err().response_code(), Some(1));
        assert_eq!(client.register_person().await.unwrap_err().response_code(), Some(1));
        assert!(!client.is_app_id_available());
        assert_eq!(transport.calls(Endpoint::CheckAppId), 2);
        assert_eq!(transport.calls(Endpoint::Registration), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_is_surfaced() {
        let (client, transport) = client("X", user());
        transport.reply(
            Endpoint::CheckAppId,
            Reply::Fail(TransportError::Connect("connection refused".to_string())),
        );

        let err = client.register_person().await.unwrap_err();
        assert!(matches!(err, VerdiError::Transport(TransportError::Connect(_))));
        assert_eq!(transport.calls(Endpoint::Registration), 0);
    }

    #[tokio::test]
    async fn test_http_error_is_service_unavailable() {
        let (client, transport) = client("X", user());
        transport.reply(Endpoint::CheckAppId, Reply::Http(503, None));

        let err = assert_err!(client.check_app_id().await);
        assert!(matches!(err, VerdiError::ServiceUnavailable { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_empty_device_id_sends_nothing() {
        let (client, transport) = client(
            "X",
            UserSession {
                device_id: String::new(),
                ..user()
            },
        );

        assert!(matches!(client.register_person().await, Err(VerdiError::NotInitialized)));
        assert!(matches!(client.verify_person().await, Err(VerdiError::NotInitialized)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_verify_with_closed_gate_continues_as_registration() {
        let (client, transport) = client("X", user());
        transport
            .ok(Endpoint::CheckAppId, r#"{"code":0}"#)
            .ok(Endpoint::Registration, r#"{"code":0}"#);

        assert_ok!(client.verify_person().await);
        assert_eq!(transport.calls(Endpoint::Registration), 1);
        assert_eq!(transport.calls(Endpoint::Verification), 0);
    }

    #[tokio::test]
    async fn test_verify_with_open_gate_sends_reduced_payload() {
        let (client, transport) = client(
            "X",
            UserSession {
                scanner_serial: "SC-77".to_string(),
                ..user()
            },
        );
        transport
            .ok(Endpoint::CheckAppId, r#"{"code":0}"#)
            .ok(Endpoint::Verification, r#"{"code":0,"scannerSerial":"SC-77"}"#);

        assert_ok!(client.check_app_id().await);
        let response = client.verify_person().await.unwrap();
        assert_eq!(response.scanner_serial.as_deref(), Some("SC-77"));

        let body = transport.body(1);
        assert!(body.get("personPassport").is_none());
        assert!(body["personPhoto"].get("personPhoto").is_none());
        assert_eq!(body["personPhoto"]["photoFromCamera"], "");
        assert_eq!(body["serviceInfo"]["ServiceInfo"]["scannerSerial"], "SC-77");
        assert_eq!(body["signString"], signature::DEPLOYED_VERIFICATION_SIGNATURE);
        assert_eq!(body["signString"], "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[tokio::test]
    async fn test_concurrent_registrations_share_one_app_id_check() {
        let (client, transport) = client("X", user());
        transport
            .ok(Endpoint::CheckAppId, r#"{"code":0}"#)
            .ok(Endpoint::Registration, r#"{"code":0}"#)
            .ok(Endpoint::Registration, r#"{"code":0}"#);

        let (a, b) = tokio::join!(client.register_person(), client.register_person());
        assert_ok!(a);
        assert_ok!(b);
        assert_eq!(transport.calls(Endpoint::CheckAppId), 1);
        assert_eq!(transport.calls(Endpoint::Registration), 2);
    }

    #[tokio::test]
    async fn test_phone_confirmation_uses_phone_auth() {
        let (client, transport) = client("X", user());
        transport
            .ok(Endpoint::CheckAppId, r#"{"code":0}"#)
            .ok(Endpoint::SendPhone, r#"{"code":0}"#)
            .ok(Endpoint::CheckPhone, r#"{"code":11,"message":"wrong code"}"#);

        assert_ok!(client.send_phone("998901234567").await);
        let err = client.check_phone("998901234567", "0000").await.unwrap_err();
        assert_eq!(err.response_code(), Some(11));

        let requests = transport.requests();
        assert_eq!(requests[1].header("Authorization"), Some("Basic ZGlnaWQ6ZGlnaWQyMDE5"));
        assert_eq!(transport.body(2)["code"], "0000");
    }

    #[tokio::test]
    async fn test_cancel_all_reaches_transport() {
        let (client, transport) = client("X", user());
        client.cancel_all();
        assert_eq!(transport.cancels.load(Ordering::SeqCst), 1);
    }

    // Facade

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }

        fn push(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl VerdiListener for Recorder {
        fn on_success(&self, result: VerdiResult) {
            match result {
                VerdiResult::DocumentScanned(fields) => self.push(format!("scanned:{}", fields.serial_number)),
                VerdiResult::Verified(r) => self.push(format!("verified:{:?}", r.code)),
            }
        }

        fn on_error(&self, error: VerdiError) {
            self.push(format!("error:{error:?}"));
        }
    }

    impl VerdiRegisterListener for Recorder {
        fn on_register_success(&self, response: RegistrationResponse) {
            self.push(format!("registered:{:?}", response.code));
        }

        fn on_register_error(&self, error: VerdiError) {
            self.push(format!("register-error:{error:?}"));
        }
    }

    impl DocumentScanner for Recorder {
        fn start_scan(&self, mode: ScanMode) {
            self.push(format!("scan:{mode:?}"));
        }
    }

    impl NfcReader for Recorder {
        fn start_read(&self, request: NfcReadRequest) {
            self.push(format!(
                "nfc:{}:{}:{}",
                request.serial_number, request.birth_date, request.date_of_expiry
            ));
        }
    }

    impl SelfieCapture for Recorder {
        fn start_capture(&self) {
            self.push("selfie".to_string());
        }
    }

    fn verdi(
        nfc_available: bool,
    ) -> (Verdi, Arc<MockTransport>, Arc<Recorder>, verdi_sdk::dispatch::MainThreadQueue) {
        verdi_on(Handle::current(), nfc_available)
    }

    fn verdi_on(
        runtime: Handle,
        nfc_available: bool,
    ) -> (Verdi, Arc<MockTransport>, Arc<Recorder>, verdi_sdk::dispatch::MainThreadQueue) {
        let transport = Arc::new(MockTransport::default());
        let platform_events = Arc::new(Recorder::default());
        let (dispatcher, queue) = main_thread();

        let verdi = Verdi::new();
        verdi.init(
            HostContext {
                device_id: "device-1".to_string(),
                device_model: "Pixel 7".to_string(),
                nfc_available,
            },
            Configuration::new("X"),
            Platform {
                transport: transport.clone(),
                dispatcher: Arc::new(dispatcher),
                scanner: platform_events.clone(),
                nfc: Some(platform_events.clone()),
                selfie: platform_events.clone(),
                ids: Some(Arc::new(SequentialIds::default())),
                runtime,
            },
        );
        (verdi, transport, platform_events, queue)
    }

    #[tokio::test]
    async fn test_operations_before_init_report_not_initialized() {
        let verdi = Verdi::new();
        let listener = Arc::new(Recorder::default());

        verdi.open_document_scan(listener.clone(), false).await;
        verdi
            .proceed_with_document_and_selfie("AA1234567", "01.02.1990", "01.02.2030", listener.clone())
            .await;

        verdi.register_person(listener.clone());
        verdi.verify_person(listener.clone());

        assert_eq!(
            listener.events(),
            vec![
                "error:NotInitialized",
                "register-error:NotInitialized",
                "register-error:NotInitialized",
                "error:NotInitialized",
            ]
        );
        assert!(!verdi.is_nfc_available());
        assert!(verdi.session().is_err());
    }

    #[tokio::test]
    async fn test_capture_handlers_before_init_fail() {
        let verdi = Verdi::new();

        assert!(matches!(
            verdi.on_document_scanned(DocumentFields::default()).await,
            Err(VerdiError::NotInitialized)
        ));
        assert!(matches!(
            verdi.on_nfc_read(verdi_sdk::session::ChipData::default()).await,
            Err(VerdiError::NotInitialized)
        ));
        assert!(matches!(
            verdi.on_selfie_captured(b"face".to_vec()).await,
            Err(VerdiError::NotInitialized)
        ));
    }

    #[test]
    fn test_register_from_thread_outside_runtime() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let (verdi, transport, _platform, mut queue) = verdi_on(runtime.handle().clone(), false);
        transport
            .ok(Endpoint::CheckAppId, r#"{"code":0}"#)
            .ok(Endpoint::Registration, r#"{"code":0}"#);
        let listener = Arc::new(Recorder::default());

        // No runtime is entered on this thread, as on a host UI thread.
        assert!(Handle::try_current().is_err());
        verdi.register_person(listener.clone());

        assert!(runtime.block_on(queue.run_next()));
        assert_eq!(listener.events(), vec!["registered:Some(0)"]);
        assert_eq!(transport.calls(Endpoint::Registration), 1);
    }

    #[tokio::test]
    async fn test_verify_person_delivers_to_given_listener() {
        let (verdi, transport, _platform, mut queue) = verdi(false);
        transport.ok(Endpoint::CheckAppId, r#"{"code":0}"#).ok(
            Endpoint::Registration,
            r#"{"code":5,"message":"device unknown"}"#,
        );
        let listener = Arc::new(Recorder::default());

        verdi.verify_person(listener.clone());
        assert!(queue.run_next().await);

        let events = listener.events();
        assert_eq!(events.len(), 1);
        assert!(events[0].starts_with("error:Domain"));
    }

    #[tokio::test]
    async fn test_result_without_listener_is_dropped_on_queue() {
        let (verdi, transport, _platform, mut queue) = verdi(false);
        transport
            .ok(Endpoint::CheckAppId, r#"{"code":0}"#)
            .ok(Endpoint::Registration, r#"{"code":0}"#);

        // No register listener was ever set.
        assert_ok!(verdi.on_selfie_captured(b"face".to_vec()).await);
        assert!(queue.run_next().await);
        assert_eq!(transport.calls(Endpoint::Registration), 1);
        assert_eq!(queue.run_pending(), 0);
    }

    #[tokio::test]
    async fn test_document_scan_result_is_delivered_on_main_queue() {
        let (verdi, _transport, platform, mut queue) = verdi(false);
        let listener = Arc::new(Recorder::default());

        verdi.open_document_scan(listener.clone(), true).await;
        assert_eq!(platform.events(), vec!["scan:IdCard"]);

        assert_ok!(
            verdi
                .on_document_scanned(DocumentFields {
                    serial_number: "AB7654321".to_string(),
                    ..Default::default()
                })
                .await
        );
        assert!(listener.events().is_empty());

        assert_eq!(queue.run_pending(), 1);
        assert_eq!(listener.events(), vec!["scanned:AB7654321"]);
        assert_eq!(verdi.session().unwrap().user().await.serial_number, "AB7654321");
    }

    #[tokio::test]
    async fn test_document_input_validation() {
        let (verdi, transport, platform, _queue) = verdi(false);
        let listener = Arc::new(Recorder::default());

        verdi
            .proceed_with_document_and_selfie("", "01.02.1990", "01.02.2030", listener.clone())
            .await;
        verdi
            .proceed_with_document_and_selfie("AA12", "01.02.1990", "01.02.2030", listener.clone())
            .await;

        let events = listener.events();
        assert_eq!(events[0], format!("register-error:{:?}", VerdiError::Validation(ValidationError::Empty)));
        assert!(events[1].starts_with("register-error:Validation(InvalidFormat"));
        assert!(platform.events().is_empty());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_nfc_is_used_when_available() {
        let (verdi, _transport, platform, _queue) = verdi(true);
        let listener = Arc::new(Recorder::default());
        assert!(verdi.is_nfc_available());

        verdi
            .proceed_with_document_and_selfie("AA1234567", "07.11.1985", "01.02.2030", listener.clone())
            .await;
        assert_eq!(platform.events(), vec!["nfc:AA1234567:851107:300201"]);

        assert_ok!(
            verdi
                .on_nfc_read(verdi_sdk::session::ChipData {
                    personal_number: Some("30711851234567".to_string()),
                    ..Default::default()
                })
                .await
        );
        assert_eq!(platform.events().last().map(String::as_str), Some("selfie"));
        assert_eq!(
            verdi.session().unwrap().user().await.personal_number,
            "30711851234567"
        );
    }

    #[tokio::test]
    async fn test_full_registration_flow_without_nfc() {
        let (verdi, transport, platform, mut queue) = verdi(false);
        transport
            .ok(Endpoint::CheckAppId, r#"{"code":0}"#)
            .ok(Endpoint::Registration, r#"{"code":0,"message":"ok"}"#);
        let listener = Arc::new(Recorder::default());

        verdi
            .proceed_with_document_and_selfie("AA1234567", "01.02.1990", "01.02.2030", listener.clone())
            .await;
        assert_eq!(platform.events(), vec!["selfie"]);
        assert!(!verdi.is_user_registered().await);

        assert_ok!(verdi.on_selfie_captured(b"face".to_vec()).await);
        assert!(listener.events().is_empty());

        assert!(queue.run_next().await);
        assert_eq!(listener.events(), vec!["registered:Some(0)"]);
        assert_eq!(transport.calls(Endpoint::Registration), 1);
    }

    #[tokio::test]
    async fn test_selfie_for_registered_user_is_verified() {
        let (verdi, transport, _platform, mut queue) = verdi(false);
        transport
            .ok(Endpoint::CheckAppId, r#"{"code":0}"#)
            .ok(Endpoint::Registration, r#"{"code":0}"#)
            .ok(Endpoint::Verification, r#"{"code":20,"message":"no match"}"#);
        let listener = Arc::new(Recorder::default());

        // First verification goes through the app id check and continues as registration.
        verdi.open_selfie(Some(listener.clone()), "SC-1").await;
        assert!(verdi.is_user_registered().await);
        assert_ok!(verdi.on_selfie_captured(b"face".to_vec()).await);
        assert!(queue.run_next().await);

        verdi.open_selfie(Some(listener.clone()), "SC-1").await;
        assert_ok!(verdi.on_selfie_captured(b"face".to_vec()).await);
        assert!(queue.run_next().await);

        let events = listener.events();
        assert_eq!(events[0], "verified:Some(0)");
        assert!(events[1].starts_with("error:Domain"));
        assert_eq!(transport.calls(Endpoint::Verification), 1);
    }
}
