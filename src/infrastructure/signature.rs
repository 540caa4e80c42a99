//! PayOS签名编解码：HMAC-SHA256小写hex摘要。
//!
//! 两种规范化模式对应渠道的两种校验方式：
//! (a) 下单签名：固定字段按 amount/cancelUrl/description/orderCode/returnUrl
//!     顺序以`&`拼接成query-string形式；
//! (b) 通用签名：键按字典序排序、无多余空白的确定性JSON序列化。

use crate::domain::errors::{DomainError, DomainResult};
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// 对UTF-8消息做HMAC-SHA256签名，输出小写hex。
/// 密钥为空时报配置错误，绝不悄悄产出空签名。
pub fn sign(secret: &str, message: &str) -> DomainResult<String> {
    if secret.is_empty() {
        return Err(DomainError::Configuration(
            "PAYOS_SECRET_KEY is not configured, cannot sign payment data".to_string(),
        ));
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| DomainError::Internal(format!("HMAC init error: {}", e)))?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// 下单签名（模式a）
pub fn payment_request_signature(
    secret: &str,
    amount: i64,
    cancel_url: &str,
    description: &str,
    order_code: i64,
    return_url: &str,
) -> DomainResult<String> {
    let message = format!(
        "amount={}&cancelUrl={}&description={}&orderCode={}&returnUrl={}",
        amount, cancel_url, description, order_code, return_url
    );
    sign(secret, &message)
}

/// 通用JSON签名（模式b）
pub fn json_signature(secret: &str, payload: &Value) -> DomainResult<String> {
    let mut canonical = String::new();
    write_canonical_json(payload, &mut canonical);
    sign(secret, &canonical)
}

/// 校验Webhook签名：剔除signature字段后按模式b重算，常量时间比较。
/// 任何畸形输入（非对象、签名非hex等）一律返回false，不报错。
pub fn verify(secret: &str, payload: &Value, claimed: &str) -> bool {
    let Some(object) = payload.as_object() else {
        return false;
    };

    let mut unsigned = object.clone();
    unsigned.remove("signature");

    let Ok(expected) = json_signature(secret, &Value::Object(unsigned)) else {
        return false;
    };

    expected.as_bytes().ct_eq(claimed.as_bytes()).into()
}

/// 确定性JSON序列化：对象键按字典序排序，`,`/`:`分隔无空白，
/// 与渠道侧 json.dumps(data, separators=(',',':'), sort_keys=True) 一致。
fn write_canonical_json(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by_key(|(key, _)| *key);

            out.push('{');
            for (i, (key, item)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push(':');
                write_canonical_json(item, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical_json(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "test-checksum-key";

    #[test]
    fn test_sign_rejects_empty_secret() {
        let result = sign("", "amount=1000");
        assert!(matches!(result, Err(DomainError::Configuration(_))));
    }

    #[test]
    fn test_canonical_json_sorts_keys_and_strips_whitespace() {
        let payload = json!({
            "b": { "d": 1, "c": 2 },
            "a": [1, "x", true],
            "n": null
        });

        let via_value = json_signature(SECRET, &payload).unwrap();
        let via_string =
            sign(SECRET, r#"{"a":[1,"x",true],"b":{"c":2,"d":1},"n":null}"#).unwrap();
        assert_eq!(via_value, via_string);
    }

    #[test]
    fn test_payment_request_signature_field_order() {
        let via_helper = payment_request_signature(
            SECRET,
            150_000,
            "https://shop.example/payment/payment-result",
            "Order #42",
            42,
            "https://shop.example/payment/payment-result",
        )
        .unwrap();

        let via_string = sign(
            SECRET,
            "amount=150000&cancelUrl=https://shop.example/payment/payment-result\
             &description=Order #42&orderCode=42\
             &returnUrl=https://shop.example/payment/payment-result",
        )
        .unwrap();
        assert_eq!(via_helper, via_string);
    }

    #[test]
    fn test_verify_roundtrip() {
        let mut payload = json!({
            "orderCode": 7,
            "status": "success",
            "transactionId": "tx-9"
        });

        let signature = json_signature(SECRET, &payload).unwrap();
        assert!(verify(SECRET, &payload, &signature));

        // signature字段本身不参与签名
        payload["signature"] = Value::String(signature.clone());
        assert!(verify(SECRET, &payload, &signature));
    }

    #[test]
    fn test_verify_rejects_mutated_payload() {
        let payload = json!({ "orderCode": 7, "status": "success" });
        let signature = json_signature(SECRET, &payload).unwrap();

        let tampered = json!({ "orderCode": 8, "status": "success" });
        assert!(!verify(SECRET, &tampered, &signature));

        let flipped = json!({ "orderCode": 7, "status": "failed" });
        assert!(!verify(SECRET, &flipped, &signature));
    }

    #[test]
    fn test_verify_rejects_mutated_signature() {
        let payload = json!({ "orderCode": 7, "status": "success" });
        let signature = json_signature(SECRET, &payload).unwrap();

        let mut corrupted = signature.clone().into_bytes();
        corrupted[0] = if corrupted[0] == b'a' { b'b' } else { b'a' };
        let corrupted = String::from_utf8(corrupted).unwrap();

        assert!(!verify(SECRET, &payload, &corrupted));
        assert!(!verify(SECRET, &payload, &signature[1..]));
        assert!(!verify(SECRET, &payload, ""));
    }

    #[test]
    fn test_verify_rejects_non_object_payload() {
        let payload = json!([1, 2, 3]);
        assert!(!verify(SECRET, &payload, "deadbeef"));
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let payload = json!({ "orderCode": 7, "status": "success" });
        let signature = json_signature(SECRET, &payload).unwrap();
        assert!(!verify("another-key", &payload, &signature));
    }
}
