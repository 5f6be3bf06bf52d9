// Copyright (C) 2024 Huawei Device Co., Ltd.
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::*;

// @tc.name: ut_error_code_mapping
// @tc.desc: Test conversion of service errors into error codes
// @tc.precon: NA
// @tc.step: 1. Build each kind of service error
//           2. Convert to ErrorCode
// @tc.expect: Each error maps to its documented code
// @tc.type: FUNC
// @tc.require: issues#WEBAPP03
#[test]
fn ut_error_code_mapping() {
    let io = ServiceError::from(io::Error::new(io::ErrorKind::Other, "disk"));
    assert_eq!(ErrorCode::from(io), ErrorCode::Other);

    let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert_eq!(ServiceError::from(json).code(), ErrorCode::InvalidPayload);

    let exhausted = ServiceError::from(ErrorCode::SlotExhausted);
    assert_eq!(exhausted.code(), ErrorCode::SlotExhausted);
    assert_eq!(exhausted.to_string(), "SlotExhausted");
}
