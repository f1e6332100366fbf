// ==========================================
// 月度销售趋势分析 - 字段映射器
// ==========================================
// 职责: 原始记录 → 源数据实体 + 类型转换
// 日期: MM/DD/YYYY 优先，YYYY-MM-DD 兼容
// ==========================================

use crate::domain::sales::{Customer, Order, OrderLine, Payment, Product};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRecord;
use chrono::NaiveDate;

/// 导入日期格式（按顺序尝试）
const IMPORT_DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d"];

/// 绑定文件名的字段映射器（错误信息带文件名 + 行号）
pub struct FieldMapper<'a> {
    file: &'a str,
}

impl<'a> FieldMapper<'a> {
    pub fn new(file: &'a str) -> Self {
        Self { file }
    }

    pub fn map_customer(&self, rec: &RawRecord) -> ImportResult<Customer> {
        Ok(Customer {
            customer_id: self.require_i64(rec, "customer_id")?,
            customer_name: self.require_string(rec, "customer_name")?,
            email: self.require_string(rec, "email")?,
            phone_number: self.get_string(rec, "phone_number"),
            city: self.get_string(rec, "city"),
            country: self.get_string(rec, "country"),
        })
    }

    pub fn map_product(&self, rec: &RawRecord) -> ImportResult<Product> {
        Ok(Product {
            product_id: self.require_i64(rec, "product_id")?,
            product_name: self.require_string(rec, "product_name")?,
            category: self.get_string(rec, "category"),
            price: self.require_f64(rec, "price")?,
        })
    }

    pub fn map_order(&self, rec: &RawRecord) -> ImportResult<Order> {
        Ok(Order {
            order_id: self.require_i64(rec, "order_id")?,
            customer_id: self.require_i64(rec, "customer_id")?,
            order_date: self.require_date(rec, "order_date")?,
            status: self.get_string(rec, "status"),
        })
    }

    pub fn map_order_line(&self, rec: &RawRecord) -> ImportResult<OrderLine> {
        Ok(OrderLine {
            item_id: self.require_i64(rec, "item_id")?,
            order_id: self.require_i64(rec, "order_id")?,
            product_id: self.require_i64(rec, "product_id")?,
            quantity: self.require_i64(rec, "quantity")?,
            price: self.require_f64(rec, "price")?,
        })
    }

    pub fn map_payment(&self, rec: &RawRecord) -> ImportResult<Payment> {
        Ok(Payment {
            payment_id: self.require_i64(rec, "payment_id")?,
            amount: self.require_f64(rec, "amount")?,
            order_id: self.require_i64(rec, "order_id")?,
            payment_method: self.get_string(rec, "payment_method"),
            payment_date: self.require_date(rec, "payment_date")?,
        })
    }

    /// 提取字符串字段，支持列名别名
    pub fn get_string(&self, rec: &RawRecord, key: &str) -> Option<String> {
        let aliases: &[&str] = match key {
            "phone_number" => &["phone_number", "phone number"],
            _ => &[],
        };

        std::iter::once(key)
            .chain(aliases.iter().copied())
            .find_map(|column| rec.get(column))
            .map(str::to_string)
    }

    fn require_string(&self, rec: &RawRecord, key: &str) -> ImportResult<String> {
        self.get_string(rec, key)
            .ok_or_else(|| ImportError::MissingField {
                file: self.file.to_string(),
                row: rec.row,
                field: key.to_string(),
            })
    }

    fn require_i64(&self, rec: &RawRecord, key: &str) -> ImportResult<i64> {
        let value = self.require_string(rec, key)?;
        value
            .parse::<i64>()
            .map_err(|_| self.conversion_error(rec, key, format!("无法解析为整数: {}", value)))
    }

    fn require_f64(&self, rec: &RawRecord, key: &str) -> ImportResult<f64> {
        let value = self.require_string(rec, key)?;
        match value.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(self.conversion_error(rec, key, format!("无法解析为有限浮点数: {}", value))),
        }
    }

    fn require_date(&self, rec: &RawRecord, key: &str) -> ImportResult<NaiveDate> {
        let value = self.require_string(rec, key)?;
        parse_import_date(&value).ok_or_else(|| ImportError::DateFormatError {
            file: self.file.to_string(),
            row: rec.row,
            field: key.to_string(),
            value,
        })
    }

    fn conversion_error(&self, rec: &RawRecord, key: &str, message: String) -> ImportError {
        ImportError::TypeConversionError {
            file: self.file.to_string(),
            row: rec.row,
            field: key.to_string(),
            message,
        }
    }
}

/// 解析导入日期（MM/DD/YYYY → YYYY-MM-DD 兼容）
pub fn parse_import_date(value: &str) -> Option<NaiveDate> {
    IMPORT_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value.trim(), fmt).ok())
}
