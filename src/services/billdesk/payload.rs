use crate::error::{AppError, AppResult};
use crate::models::Amount;

pub const FIELD_SEPARATOR: char = '|';
pub const FIELD_COUNT: usize = 21;
pub const PLACEHOLDER: &str = "NA";
pub const DEFAULT_CURRENCY: &str = "INR";
/// TypeField1: retail.
pub const TYPE_FIELD_RETAIL: &str = "R";
/// TypeField2: general.
pub const TYPE_FIELD_GENERAL: &str = "F";

/// Inputs of the BillDesk payment request message.
#[derive(Debug, Clone)]
pub struct PaymentMessage<'a> {
    pub merchant_id: &'a str,
    pub customer_reference: &'a str,
    pub amount: &'a Amount,
    pub currency: &'a str,
    pub security_id: &'a str,
    pub return_url: &'a str,
}

impl<'a> PaymentMessage<'a> {
    /// Positional fields in gateway order. Positions are fixed by BillDesk;
    /// a shifted field produces a message the gateway rejects.
    pub fn fields(&self) -> [&'a str; FIELD_COUNT] {
        [
            self.merchant_id,        // 1  MerchantID
            self.customer_reference, // 2  CustomerID
            PLACEHOLDER,             // 3
            self.amount.as_str(),    // 4  TxnAmount
            PLACEHOLDER,             // 5
            PLACEHOLDER,             // 6
            PLACEHOLDER,             // 7
            self.currency,           // 8  CurrencyType
            PLACEHOLDER,             // 9
            TYPE_FIELD_RETAIL,       // 10 TypeField1
            self.security_id,        // 11 SecurityID
            PLACEHOLDER,             // 12
            PLACEHOLDER,             // 13
            TYPE_FIELD_GENERAL,      // 14 TypeField2
            PLACEHOLDER,             // 15 AdditionalInfo1
            PLACEHOLDER,             // 16 AdditionalInfo2
            PLACEHOLDER,             // 17 AdditionalInfo3
            PLACEHOLDER,             // 18 AdditionalInfo4
            PLACEHOLDER,             // 19 AdditionalInfo5
            PLACEHOLDER,             // 20 AdditionalInfo6
            self.return_url,         // 21 RU
        ]
    }

    /// Joins the fields with `|`. Fails when a field is empty or would
    /// itself introduce a separator.
    pub fn encode(&self) -> AppResult<String> {
        let fields = self.fields();

        for (position, field) in fields.iter().enumerate() {
            if field.is_empty() {
                return Err(AppError::Config(format!(
                    "BillDesk message field {} is empty",
                    position + 1
                )));
            }
            if field.contains(FIELD_SEPARATOR) {
                return Err(AppError::Validation(format!(
                    "BillDesk message field {} contains '{}'",
                    position + 1,
                    FIELD_SEPARATOR
                )));
            }
        }

        Ok(fields.join("|"))
    }
}
