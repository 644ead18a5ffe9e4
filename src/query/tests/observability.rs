// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#[cfg(test)]
mod tests {
    use cloud_sdk_query::{build, unmarshal, unmarshal_error};
    use gax::options::ClientConfig;
    use gax::request::{HttpResponse, Operation, Request};
    use http::{HeaderMap, StatusCode};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tracing::{Event, Subscriber, field, span};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use tracing_subscriber::registry::Registry;
    type TestResult = anyhow::Result<()>;

    #[derive(Clone, Debug, Default)]
    struct Captured {
        name: String,
        fields: HashMap<String, String>,
    }

    #[derive(Clone, Default)]
    struct TestLayer {
        spans: Arc<Mutex<Vec<Captured>>>,
        events: Arc<Mutex<Vec<Captured>>>,
    }

    impl TestLayer {
        fn spans(&self) -> Vec<Captured> {
            self.spans.lock().map(|s| s.clone()).unwrap_or_default()
        }

        fn events(&self) -> Vec<Captured> {
            self.events.lock().map(|e| e.clone()).unwrap_or_default()
        }
    }

    struct TestVisitor<'a>(&'a mut HashMap<String, String>);

    impl field::Visit for TestVisitor<'_> {
        fn record_str(&mut self, field: &field::Field, value: &str) {
            self.0.insert(field.name().to_string(), value.to_string());
        }

        fn record_i64(&mut self, field: &field::Field, value: i64) {
            self.0.insert(field.name().to_string(), value.to_string());
        }

        fn record_u64(&mut self, field: &field::Field, value: u64) {
            self.0.insert(field.name().to_string(), value.to_string());
        }

        fn record_debug(&mut self, field: &field::Field, value: &dyn std::fmt::Debug) {
            self.0.insert(field.name().to_string(), format!("{value:?}"));
        }
    }

    impl<S: Subscriber> Layer<S> for TestLayer {
        fn on_new_span(&self, attrs: &span::Attributes<'_>, _id: &span::Id, _ctx: Context<'_, S>) {
            let mut captured = Captured {
                name: attrs.metadata().name().to_string(),
                ..Default::default()
            };
            attrs.record(&mut TestVisitor(&mut captured.fields));
            if let Ok(mut spans) = self.spans.lock() {
                spans.push(captured);
            }
        }

        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut captured = Captured {
                name: event.metadata().level().to_string(),
                ..Default::default()
            };
            event.record(&mut TestVisitor(&mut captured.fields));
            if let Ok(mut events) = self.events.lock() {
                events.push(captured);
            }
        }
    }

    fn with_layer<F: FnOnce()>(f: F) -> TestLayer {
        let layer = TestLayer::default();
        let subscriber = Registry::default().with(layer.clone());
        tracing::subscriber::with_default(subscriber, f);
        layer
    }

    fn new_request(
        config: &ClientConfig,
    ) -> gax::Result<Request<serde_json::Value, ()>> {
        Request::new(
            config,
            "https://test.example.com",
            Operation::new("OperationName"),
            "2014-01-01",
            Some(serde_json::json!({"Secret": "do-not-log", "Count": 2})),
            None,
        )
    }

    #[test]
    fn spans() -> TestResult {
        let mut request = new_request(&ClientConfig::new().enable_tracing())?;
        let layer = with_layer(|| {
            build(&mut request);
            request.set_http_response(HttpResponse::from_bytes(
                StatusCode::OK,
                HeaderMap::new(),
                "<OperationNameResponse/>",
            ));
            unmarshal(&mut request);
        });
        assert!(request.error().is_none(), "{:?}", request.error());

        let spans = layer.spans();
        let names = spans.iter().map(|s| s.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["build", "unmarshal"]);
        let build_span = &spans[0];
        assert_eq!(
            build_span.fields.get("operation").map(String::as_str),
            Some("OperationName")
        );
        assert_eq!(
            build_span.fields.get("api_version").map(String::as_str),
            Some("2014-01-01")
        );
        let unmarshal_span = &spans[1];
        assert_eq!(
            unmarshal_span.fields.get("http.status_code").map(String::as_str),
            Some("200")
        );

        let events = layer.events();
        let parameters = events
            .iter()
            .find_map(|e| e.fields.get("parameters"))
            .map(String::as_str);
        // Action, Version, Count, Secret
        assert_eq!(parameters, Some("4"));
        for e in &events {
            for value in e.fields.values() {
                assert!(!value.contains("do-not-log"), "{e:?}");
            }
        }
        Ok(())
    }

    #[test]
    fn fault_event() -> TestResult {
        let mut request = new_request(&ClientConfig::new().enable_tracing())?;
        let layer = with_layer(|| {
            request.set_http_response(HttpResponse::from_bytes(
                StatusCode::BAD_REQUEST,
                HeaderMap::new(),
                "<ErrorResponse><Error><Code>Throttling</Code></Error></ErrorResponse>",
            ));
            unmarshal_error(&mut request);
        });
        let spans = layer.spans();
        assert_eq!(
            spans.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            vec!["unmarshal_error"]
        );
        assert_eq!(
            spans[0].fields.get("http.status_code").map(String::as_str),
            Some("400")
        );
        let events = layer.events();
        assert!(
            events
                .iter()
                .any(|e| e.fields.get("code").map(String::as_str) == Some("Throttling")),
            "{events:?}"
        );
        Ok(())
    }

    struct BrokenBody;

    impl std::io::Read for BrokenBody {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("connection reset"))
        }
    }

    #[test]
    fn drain_error_event() -> TestResult {
        let mut request = new_request(&ClientConfig::new().enable_tracing())?;
        let layer = with_layer(|| {
            request.set_http_response(HttpResponse::new(
                StatusCode::OK,
                HeaderMap::new(),
                BrokenBody,
            ));
            unmarshal(&mut request);
        });
        assert!(request.error().is_none(), "{:?}", request.error());
        let events = layer.events();
        assert!(
            events.iter().any(|e| e.name == "DEBUG"
                && e.fields
                    .get("message")
                    .is_some_and(|m| m.contains("cannot drain response body: connection reset"))),
            "{events:?}"
        );
        Ok(())
    }

    #[test]
    fn events_require_tracing() -> TestResult {
        let mut request = new_request(&ClientConfig::new().disable_tracing())?;
        let layer = with_layer(|| {
            build(&mut request);
            request.set_http_response(HttpResponse::from_bytes(
                StatusCode::BAD_REQUEST,
                HeaderMap::new(),
                "not xml",
            ));
            unmarshal_error(&mut request);
        });
        assert!(request.error().is_some_and(|e| e.is_deserialization()));
        assert_eq!(layer.spans().len(), 2);
        assert!(layer.events().is_empty(), "{:?}", layer.events());
        Ok(())
    }
}
