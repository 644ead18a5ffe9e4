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

//! Runs the handlers in the order a generated client does.

#[cfg(test)]
mod tests {
    use cloud_sdk_query::decode::{self, Result as DecodeResult};
    use cloud_sdk_query::query_parameter::Result as EncodeResult;
    use cloud_sdk_query::unmarshal::REQUEST_ID_HEADER;
    use cloud_sdk_query::{
        Encoder, Member, QueryParameter, XmlDecode, XmlNode, build, unmarshal, unmarshal_error,
    };
    use gax::error::fault::Fault;
    use gax::options::ClientConfig;
    use gax::request::{HttpResponse, Operation, Request};
    use http::{HeaderMap, HeaderValue, StatusCode};
    use pretty_assertions::assert_eq;
    use test_case::test_case;
    type TestResult = anyhow::Result<()>;

    #[derive(Debug, Default)]
    struct SendMessageRequest {
        queue_url: String,
        message_body: String,
        delay_seconds: Option<i32>,
        attributes: std::collections::HashMap<String, String>,
    }

    impl QueryParameter for SendMessageRequest {
        fn add(&self, enc: &mut Encoder, name: &str, _: &Member) -> EncodeResult<()> {
            const ATTRIBUTES: Member = Member::DEFAULT
                .set_location_name("Attribute")
                .set_flattened()
                .set_key_name("Name")
                .set_value_name("Value");
            enc.field(name, "QueueUrl", &self.queue_url, &Member::DEFAULT)?;
            enc.field(name, "MessageBody", &self.message_body, &Member::DEFAULT)?;
            enc.field(name, "DelaySeconds", &self.delay_seconds, &Member::DEFAULT)?;
            enc.field(name, "Attributes", &self.attributes, &ATTRIBUTES)?;
            Ok(())
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct SendMessageResponse {
        message_id: String,
        md5_of_message_body: String,
    }

    impl XmlDecode for SendMessageResponse {
        fn decode_into(&mut self, node: &XmlNode, _: &Member) -> DecodeResult<()> {
            decode::field(node, "MessageId", &mut self.message_id, &Member::DEFAULT)?;
            decode::field(
                node,
                "MD5OfMessageBody",
                &mut self.md5_of_message_body,
                &Member::DEFAULT,
            )?;
            Ok(())
        }
    }

    fn new_request() -> gax::Result<Request<SendMessageRequest, SendMessageResponse>> {
        Request::new(
            &ClientConfig::new(),
            "https://sqs.us-east-1.amazonaws.com",
            Operation::new("SendMessage"),
            "2012-11-05",
            Some(SendMessageRequest {
                queue_url: "https://sqs.us-east-1.amazonaws.com/123/q".into(),
                message_body: "hello world".into(),
                delay_seconds: Some(0),
                attributes: [("color".to_string(), "red".to_string())].into(),
            }),
            Some(SendMessageResponse::default()),
        )
    }

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("header-id"));
        headers
    }

    // Dispatches on the status code like the transport does.
    fn receive<P, D: XmlDecode>(request: &mut Request<P, D>, response: HttpResponse) {
        let success = response.status().is_success();
        request.set_http_response(response);
        if success {
            unmarshal(request);
        } else {
            unmarshal_error(request);
        }
    }

    #[test]
    fn success() -> TestResult {
        let mut request = new_request()?;
        build(&mut request);
        assert!(request.error().is_none(), "{:?}", request.error());
        let want = [
            "Action=SendMessage",
            "Attribute.1.Name=color",
            "Attribute.1.Value=red",
            "DelaySeconds=0",
            "MessageBody=hello+world",
            "QueueUrl=https%3A%2F%2Fsqs.us-east-1.amazonaws.com%2F123%2Fq",
            "Version=2012-11-05",
        ]
        .join("&");
        assert_eq!(request.http_request().body(), want.as_str());

        let body = r#"<SendMessageResponse>
              <SendMessageResult>
                <MessageId>5fea7756-0ea4-451a-a703-a558b933e274</MessageId>
                <MD5OfMessageBody>fafb00f5732ab283681e124bf8747ed1</MD5OfMessageBody>
              </SendMessageResult>
              <ResponseMetadata><RequestId>envelope-id</RequestId></ResponseMetadata>
            </SendMessageResponse>"#;
        receive(
            &mut request,
            HttpResponse::from_bytes(StatusCode::OK, headers(), body),
        );
        assert_eq!(request.request_id(), Some("header-id"));
        let got = request.into_result()?;
        assert_eq!(
            got,
            Some(SendMessageResponse {
                message_id: "5fea7756-0ea4-451a-a703-a558b933e274".into(),
                md5_of_message_body: "fafb00f5732ab283681e124bf8747ed1".into(),
            })
        );
        Ok(())
    }

    #[test_case(
        StatusCode::BAD_REQUEST,
        "<ErrorResponse><Error><Type>Sender</Type><Code>Throttling</Code><Message>Rate exceeded</Message></Error><RequestId>envelope-id</RequestId></ErrorResponse>",
        Fault::default().set_code("Throttling").set_message("Rate exceeded").set_error_type("Sender").set_request_id("envelope-id");
        "error response"
    )]
    #[test_case(
        StatusCode::BAD_REQUEST,
        "<Response><Errors><Error><Code>InvalidParameterValue</Code><Message>bad</Message></Error></Errors><RequestID>ec2-id</RequestID></Response>",
        Fault::default().set_code("InvalidParameterValue").set_message("bad").set_request_id("ec2-id");
        "ec2 response"
    )]
    #[test_case(
        StatusCode::SERVICE_UNAVAILABLE,
        "<ServiceUnavailableException/>",
        Fault::default().set_code("ServiceUnavailableException").set_message("service is unavailable").set_request_id("header-id");
        "service unavailable"
    )]
    fn service_fault(status: StatusCode, body: &'static str, want: Fault) -> TestResult {
        let mut request = new_request()?;
        build(&mut request);
        receive(
            &mut request,
            HttpResponse::from_bytes(status, headers(), body),
        );
        let err = match request.into_result() {
            Ok(data) => anyhow::bail!("expected an error, got {data:?}"),
            Err(e) => e,
        };
        assert_eq!(err.fault(), Some(&want));
        assert_eq!(err.http_status_code(), Some(status.as_u16()));
        Ok(())
    }

    #[test_case(""; "empty")]
    #[test_case("<html>Bad Gateway</html>"; "html")]
    #[test_case("<ErrorResponse><Error>"; "truncated")]
    fn undecodable_fault(body: &'static str) -> TestResult {
        let mut request = new_request()?;
        build(&mut request);
        receive(
            &mut request,
            HttpResponse::from_bytes(StatusCode::BAD_GATEWAY, headers(), body),
        );
        let err = match request.into_result() {
            Ok(data) => anyhow::bail!("expected an error, got {data:?}"),
            Err(e) => e,
        };
        assert!(err.is_deserialization(), "{err:?}");
        assert!(err.fault().is_none(), "{err:?}");
        Ok(())
    }
}
